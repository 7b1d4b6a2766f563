//! Decontam - robot fleet decontamination simulator
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, robots, particles, goals, tick)
//! - `scenario`: Line-oriented scenario file parser and writer
//! - `render`: Draw-primitive emission for an external renderer
//! - `session`: Start/stop/step/record control surface around the simulation
//! - `settings`: JSON run configuration

pub mod error;
pub mod record;
pub mod render;
pub mod scenario;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{ScenarioError, SettingsError};
pub use session::{Arrow, ControlMode, Session};
pub use settings::Settings;

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Duration of one tick
    pub const DELTA_T: f64 = 0.25;

    /// Default and maximum translation speed
    pub const VTRAN_MAX: f64 = 0.75;
    /// Default and maximum rotation speed (radians per time unit)
    pub const VROT_MAX: f64 = 0.5;
    /// Rotation speed increment for manual control
    pub const DELTA_VROT: f64 = 0.125;
    /// Translation speed increment for manual control
    pub const DELTA_VTRAN: f64 = 0.25;

    /// Arena half-size: particle centres must lie in [-DMAX, DMAX]²
    pub const DMAX: f64 = 20.0;

    pub const R_ROBOT: f64 = 0.5;

    /// Particle radius bounds
    pub const R_PARTICULE_MAX: f64 = 4.0;
    pub const R_PARTICULE_MIN: f64 = 0.3;
    /// Child radius = parent radius * factor (≈ √2 - 1, children fit inside the parent)
    pub const R_PARTICULE_FACTOR: f64 = 0.4142;

    pub const E_PARTICULE_MAX: f64 = 1.0;
    /// Child energy = parent energy * factor
    pub const E_PARTICULE_FACTOR: f64 = 0.25;

    /// Per-tick probability that a particle decomposes
    pub const DECOMPOSITION_RATE: f64 = 0.025;

    /// Distance tolerance for overlap and contact tests
    pub const EPSIL_ZERO: f64 = 1e-2;
    /// Angular tolerance for alignment tests (radians)
    pub const EPSIL_ALIGNEMENT: f64 = 0.0625;

    /// Decontamination rate at which the run is complete
    pub const FULL_RATE: f64 = 100.0;

    /// Default record log path
    pub const RECORD_FILE: &str = "out.dat";
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if angle > -PI && angle <= PI {
        return angle;
    }
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Translate `point` by `dist` along direction `angle`
#[inline]
pub fn displace(point: DVec2, angle: f64, dist: f64) -> DVec2 {
    point + DVec2::new(angle.cos(), angle.sin()) * dist
}
