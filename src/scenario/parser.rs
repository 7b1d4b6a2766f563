//! Scenario reader
//!
//! A five-state line scanner. Comment lines (first non-blank character
//! `#`) and blank lines are skipped in every state; any other line is fed
//! to `Loader::advance`, which validates it against the current state and
//! returns the next one. The first error aborts the whole load.

use std::io::{self, BufRead};

use glam::DVec2;

use super::FIN_LISTE;
use crate::error::{CollisionKind, ScenarioError, Section};
use crate::normalize_angle;
use crate::sim::geometry::{Circle, is_angle_out_of_range};
use crate::sim::{ParticleStore, RobotStore};

/// Initial store capacity while loading; declared counts are not trusted
const LOAD_RESERVE: usize = 256;

/// Where the scanner is in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    ExpectRobotCount,
    ReadingRobots { expected: usize },
    ExpectParticleCount,
    ReadingParticles { expected: usize },
    Done,
}

/// Stores under construction plus the scanner position
struct Loader {
    robots: RobotStore,
    particles: ParticleStore,
    /// Entities read so far in the current section
    read: usize,
    line: usize,
}

impl Loader {
    fn new() -> Self {
        Self {
            robots: RobotStore::new(),
            particles: ParticleStore::new(),
            read: 0,
            line: 0,
        }
    }

    fn syntax(&self, detail: impl Into<String>) -> ScenarioError {
        ScenarioError::Syntax {
            line: self.line,
            detail: detail.into(),
        }
    }

    /// Consume one significant line
    fn advance(&mut self, state: ParseState, text: &str) -> Result<ParseState, ScenarioError> {
        match state {
            ParseState::ExpectRobotCount => {
                let expected = self.count(text, Section::Robots)?;
                self.robots = RobotStore::with_capacity(expected.min(LOAD_RESERVE));
                self.read = 0;
                Ok(if expected > 0 {
                    ParseState::ReadingRobots { expected }
                } else {
                    ParseState::ExpectParticleCount
                })
            }
            ParseState::ReadingRobots { expected } => {
                if is_fin_liste(text) {
                    return self.finish_section(Section::Robots, expected, ParseState::ExpectParticleCount);
                }
                if self.read == expected {
                    return Err(ScenarioError::MissingFin {
                        line: self.line,
                        section: Section::Robots,
                    });
                }
                self.robot_line(text, expected)?;
                Ok(state)
            }
            ParseState::ExpectParticleCount => {
                let expected = self.count(text, Section::Particles)?;
                self.particles = ParticleStore::with_capacity(expected.min(LOAD_RESERVE));
                self.read = 0;
                Ok(if expected > 0 {
                    ParseState::ReadingParticles { expected }
                } else {
                    ParseState::Done
                })
            }
            ParseState::ReadingParticles { expected } => {
                if is_fin_liste(text) {
                    return self.finish_section(Section::Particles, expected, ParseState::Done);
                }
                if self.read == expected {
                    return Err(ScenarioError::MissingFin {
                        line: self.line,
                        section: Section::Particles,
                    });
                }
                self.particle_line(text, expected)?;
                Ok(state)
            }
            ParseState::Done => Err(ScenarioError::UnexpectedContent { line: self.line }),
        }
    }

    fn finish_section(
        &self,
        section: Section,
        expected: usize,
        next: ParseState,
    ) -> Result<ParseState, ScenarioError> {
        if self.read < expected {
            return Err(ScenarioError::PrematureFin {
                line: self.line,
                section,
            });
        }
        Ok(next)
    }

    /// A single non-negative integer that fits a `u32`, and nothing else
    fn count(&self, text: &str, section: Section) -> Result<usize, ScenarioError> {
        let mut tokens = text.split_whitespace();
        let token = tokens.next().unwrap_or_default();
        let count = token
            .parse::<u32>()
            .map_err(|_| self.syntax(format!("invalid {section} count {token:?}")))?;
        let count = usize::try_from(count)
            .map_err(|_| self.syntax(format!("{section} count {count} too large")))?;
        if let Some(extra) = tokens.next() {
            return Err(self.syntax(format!("unexpected {extra:?} after {section} count")));
        }
        Ok(count)
    }

    fn number(&self, token: &str) -> Result<f64, ScenarioError> {
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.syntax(format!("invalid number {token:?}")))
    }

    /// Zero or more `x y angle` triples
    fn robot_line(&mut self, text: &str, expected: usize) -> Result<(), ScenarioError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        for chunk in tokens.chunks(3) {
            if self.read == expected {
                return Err(self.syntax("more robots than declared"));
            }
            let [x, y, angle] = chunk else {
                return Err(self.syntax("incomplete robot description"));
            };
            let (x, y, angle) = (self.number(x)?, self.number(y)?, self.number(angle)?);
            if is_angle_out_of_range(angle) {
                return Err(ScenarioError::InvalidRobotAngle {
                    line: self.line,
                    angle,
                });
            }
            let index = self.robots.push(DVec2::new(x, y), normalize_angle(angle));
            self.read += 1;

            if let Some(other) = self.robots.collides_with_earlier(index) {
                return Err(ScenarioError::Collision {
                    line: self.line,
                    kind: CollisionKind::RobotRobot,
                    first: other + 1,
                    second: index + 1,
                });
            }
        }
        Ok(())
    }

    /// Zero or more `energy radius x y` quadruples
    fn particle_line(&mut self, text: &str, expected: usize) -> Result<(), ScenarioError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        for chunk in tokens.chunks(4) {
            if self.read == expected {
                return Err(self.syntax("more particles than declared"));
            }
            let [energy, radius, x, y] = chunk else {
                return Err(self.syntax("incomplete particle description"));
            };
            let energy = self.number(energy)?;
            let radius = self.number(radius)?;
            let (x, y) = (self.number(x)?, self.number(y)?);

            let circle = Circle::new(DVec2::new(x, y), radius);
            if !ParticleStore::is_valid(&circle, energy) {
                return Err(ScenarioError::InvalidParticleValue {
                    line: self.line,
                    energy,
                    radius,
                    x,
                    y,
                });
            }
            self.particles.push(circle, energy);
            let index = self.read;
            self.read += 1;

            if let Some(other) = self.particles.collides_with_earlier(index) {
                return Err(ScenarioError::Collision {
                    line: self.line,
                    kind: CollisionKind::ParticleParticle,
                    first: other + 1,
                    second: index + 1,
                });
            }
            if let Some(robot) = self.robots.collides_with_any_particle(&circle) {
                return Err(ScenarioError::Collision {
                    line: self.line,
                    kind: CollisionKind::RobotParticle,
                    first: robot + 1,
                    second: index + 1,
                });
            }
        }
        Ok(())
    }
}

fn is_fin_liste(text: &str) -> bool {
    text.trim() == FIN_LISTE
}

fn is_skipped(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Read a complete scenario
///
/// Returns the robot and particle stores only if the whole input is valid.
pub fn parse_scenario<R: BufRead>(reader: R) -> Result<(RobotStore, ParticleStore), ScenarioError> {
    let mut loader = Loader::new();
    let mut state = ParseState::ExpectRobotCount;

    for line in reader.lines() {
        loader.line += 1;
        let text = match line {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(loader.syntax("line is not valid UTF-8"));
            }
            Err(e) => return Err(e.into()),
        };
        if is_skipped(&text) {
            continue;
        }
        state = loader.advance(state, &text)?;
    }

    if state != ParseState::Done {
        return Err(ScenarioError::UnexpectedEndOfFile { line: loader.line });
    }
    Ok((loader.robots, loader.particles))
}

/// Read a scenario held in memory
pub fn parse_str(text: &str) -> Result<(RobotStore, ParticleStore), ScenarioError> {
    parse_scenario(text.as_bytes())
}
