//! Simulation state
//!
//! Owns both entity stores and the seeded RNG. Nothing outside a tick
//! mutates the stores while a tick is in progress.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::geometry::is_point_inside_circle;
use super::particle::ParticleStore;
use super::robot::RobotStore;
use crate::consts::DECOMPOSITION_RATE;
use glam::DVec2;

/// Complete simulation state (deterministic for a given seed)
#[derive(Debug, Clone)]
pub struct SimState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub robots: RobotStore,
    pub particles: ParticleStore,
    /// Per-tick decomposition probability of each particle
    pub decomposition_rate: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl Default for SimState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SimState {
    /// Create an empty state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            robots: RobotStore::new(),
            particles: ParticleStore::new(),
            decomposition_rate: DECOMPOSITION_RATE,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn with_decomposition_rate(mut self, rate: f64) -> Self {
        self.decomposition_rate = rate;
        self
    }

    /// Re-seed the RNG
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Drop every robot and particle
    pub fn clear(&mut self) {
        self.robots.clear_all();
        self.particles.clear_all();
        self.time_ticks = 0;
    }

    /// Install freshly loaded stores
    pub fn replace(&mut self, robots: RobotStore, particles: ParticleStore) {
        self.robots = robots;
        self.particles = particles;
        self.time_ticks = 0;
    }

    pub fn total_energy(&self) -> f64 {
        self.particles.total_energy()
    }

    /// Index of the robot whose footprint contains `point`
    pub fn robot_at(&self, point: DVec2) -> Option<usize> {
        self.robots
            .iter()
            .position(|r| is_point_inside_circle(point, &r.circle))
    }
}
