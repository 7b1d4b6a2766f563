//! Fixed timestep simulation tick
//!
//! One tick moves every robot, removes decontaminated particles, reassigns
//! goals when the population changed and then lets particles decompose.

use super::goals::assign_goals;
use super::state::SimState;
use crate::consts::FULL_RATE;

/// Advance the simulation by one tick
///
/// No-op when no particle is left.
pub fn tick(state: &mut SimState) {
    if state.particles.is_empty() {
        return;
    }
    state.time_ticks += 1;

    let SimState {
        robots, particles, ..
    } = state;
    for index in 0..robots.count() {
        if robots.is_manual(index) {
            robots.move_manual(index, particles);
        } else {
            robots.move_autonomous(index, particles);
            robots.try_decontaminate(index, particles);
        }
    }

    if state.particles.did_count_change() {
        log::debug!(
            "tick {}: {} particle(s) left, reassigning goals",
            state.time_ticks,
            state.particles.count()
        );
        assign_goals(&mut state.robots, &state.particles);
    } else {
        // Removals offset by an earlier decomposition leave the count unchanged
        state.robots.release_stale_targets(&state.particles);
    }

    let rate = state.decomposition_rate;
    if state.particles.decomposition_pass(&mut state.rng, rate) > 0 {
        state.robots.release_stale_targets(&state.particles);
    }
}

/// Goal assignment right after a scenario is loaded
pub fn initial_assignment(state: &mut SimState) {
    state.particles.did_count_change();
    assign_goals(&mut state.robots, &state.particles);
}

/// Decontamination rate bookkeeping for a recording session
///
/// `initial_energy` (Si) is captured on the first tick of the session;
/// `removed_energy` (Sd) and `rate` (Td, percent) follow each tick until
/// the rate reaches 100.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateTracker {
    pub initial_energy: f64,
    pub removed_energy: f64,
    pub rate: f64,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the run still has contamination to remove
    pub fn is_running(&self) -> bool {
        self.rate < FULL_RATE
    }

    /// Capture Si from the current particles
    pub fn capture_initial(&mut self, state: &SimState) {
        self.initial_energy = state.total_energy();
    }

    /// Recompute Sd and Td from the current particles
    pub fn update(&mut self, state: &SimState) {
        if !self.is_running() {
            return;
        }
        self.removed_energy = self.initial_energy - state.total_energy();
        self.rate = if self.initial_energy > 0.0 {
            FULL_RATE * self.removed_energy / self.initial_energy
        } else if state.particles.is_empty() {
            FULL_RATE
        } else {
            0.0
        };
    }
}
