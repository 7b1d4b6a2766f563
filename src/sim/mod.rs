//! Deterministic simulation module
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (robot index, particle insertion order)
//! - No rendering, file or platform dependencies

pub mod geometry;
pub mod goals;
pub mod particle;
pub mod robot;
pub mod state;
pub mod tick;

pub use geometry::Circle;
pub use goals::assign_goals;
pub use particle::{Particle, ParticleId, ParticleStore};
pub use robot::{Robot, RobotStore};
pub use state::SimState;
pub use tick::{RateTracker, initial_assignment, tick};
