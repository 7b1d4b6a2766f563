use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which pair of bodies overlapped while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    RobotRobot,
    RobotParticle,
    ParticleParticle,
}

impl fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollisionKind::RobotRobot => "robot/robot",
            CollisionKind::RobotParticle => "robot/particle",
            CollisionKind::ParticleParticle => "particle/particle",
        })
    }
}

/// Scenario file section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Robots,
    Particles,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Robots => "robot",
            Section::Particles => "particle",
        })
    }
}

/// Errors raised while reading or writing a scenario file
///
/// Line numbers are 1-based and count comment and blank lines. Entity
/// numbers in `Collision` are 1-based positions in their section.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot open scenario file {path:?}: {source}")]
    FileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: syntax error: {detail}")]
    Syntax { line: usize, detail: String },

    #[error("line {line}: robot angle {angle} outside [-pi, pi]")]
    InvalidRobotAngle { line: usize, angle: f64 },

    #[error("line {line}: invalid particle (energy {energy}, radius {radius}, at {x} {y})")]
    InvalidParticleValue {
        line: usize,
        energy: f64,
        radius: f64,
        x: f64,
        y: f64,
    },

    #[error("line {line}: {kind} collision between {first} and {second}")]
    Collision {
        line: usize,
        kind: CollisionKind,
        first: usize,
        second: usize,
    },

    #[error("line {line}: FIN_LISTE before all {section}s were read")]
    PrematureFin { line: usize, section: Section },

    #[error("line {line}: missing FIN_LISTE after the {section} list")]
    MissingFin { line: usize, section: Section },

    #[error("line {line}: unexpected content after the end of the scenario")]
    UnexpectedContent { line: usize },

    #[error("line {line}: unexpected end of file")]
    UnexpectedEndOfFile { line: usize },
}

/// Errors raised while reading or writing settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
