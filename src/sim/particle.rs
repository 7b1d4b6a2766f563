//! Particle store
//!
//! Particles keep their insertion order: load order first, then
//! decomposition children appended at the end. Each particle carries a
//! `ParticleId` that stays valid for as long as the particle is alive, so
//! robots can hold a target across removals that shift positions.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Circle, circles_collide, is_outside_bounds};
use crate::consts::*;

/// Stable particle handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

/// A radioactive particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub circle: Circle,
    pub energy: f64,
}

/// Ordered collection of live particles
#[derive(Debug, Clone)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    /// Count seen by the last `did_count_change` call
    previous_count: usize,
    next_id: u32,
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleStore {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            previous_count: 0,
            next_id: 1,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    fn allocate_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Reset to `n` blank slots (cleared entirely when `n == 0`)
    ///
    /// Used while loading a scenario; slots are filled with `set_particle`.
    pub fn set_count(&mut self, n: u32) {
        self.particles.clear();
        for _ in 0..n {
            let id = self.allocate_id();
            self.particles.push(Particle {
                id,
                circle: Circle::default(),
                energy: 0.0,
            });
        }
        self.previous_count = self.particles.len();
    }

    /// Fill slot `index` (0-based, must be below `count()`)
    pub fn set_particle(&mut self, index: usize, circle: Circle, energy: f64) {
        assert!(index < self.particles.len(), "particle slot {index} out of range");
        let slot = &mut self.particles[index];
        slot.circle = circle;
        slot.energy = energy;
    }

    /// Append a particle after the existing ones
    pub fn push(&mut self, circle: Circle, energy: f64) -> ParticleId {
        let id = self.allocate_id();
        self.particles.push(Particle { id, circle, energy });
        id
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn position_of(&self, index: usize) -> Option<Circle> {
        self.particles.get(index).map(|p| p.circle)
    }

    pub fn energy_of(&self, index: usize) -> Option<f64> {
        self.particles.get(index).map(|p| p.energy)
    }

    pub fn index_of(&self, id: ParticleId) -> Option<usize> {
        self.particles.iter().position(|p| p.id == id)
    }

    pub fn find(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.find(id).is_some()
    }

    /// Sum of the energies of all live particles
    pub fn total_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.energy).sum()
    }

    /// Radius, energy and arena-bounds checks for a particle description
    pub fn is_valid(circle: &Circle, energy: f64) -> bool {
        !is_outside_bounds(circle.center, DMAX)
            && circle.radius <= R_PARTICULE_MAX
            && circle.radius >= R_PARTICULE_MIN
            && energy <= E_PARTICULE_MAX
            && energy >= 0.0
    }

    /// First lower-indexed particle overlapping particle `index`
    pub fn collides_with_earlier(&self, index: usize) -> Option<usize> {
        let target = self.particles.get(index)?;
        self.particles[..index]
            .iter()
            .position(|other| circles_collide(&target.circle, &other.circle).0)
    }

    /// Unlink particle at `index`, preserving the order of the others
    pub fn remove(&mut self, index: usize) -> Option<Particle> {
        (index < self.particles.len()).then(|| self.particles.remove(index))
    }

    /// Remove the particle with handle `id`
    pub fn remove_id(&mut self, id: ParticleId) -> Option<Particle> {
        let index = self.index_of(id)?;
        self.remove(index)
    }

    /// Split particle `index` into four children
    ///
    /// Children are placed at (±r', ±r') from the parent centre, where
    /// r' = r * R_PARTICULE_FACTOR, and each takes a quarter of the energy.
    /// They tile the parent's footprint, touching but not overlapping.
    /// Returns false (store unchanged) when the children would be smaller
    /// than `R_PARTICULE_MIN`.
    pub fn decompose(&mut self, index: usize) -> bool {
        let Some(parent) = self.particles.get(index) else {
            return false;
        };
        let radius = parent.circle.radius * R_PARTICULE_FACTOR;
        if radius < R_PARTICULE_MIN {
            return false;
        }
        let energy = parent.energy * E_PARTICULE_FACTOR;
        let center = parent.circle.center;

        for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
            let child = Circle::new(center + DVec2::new(sx * radius, sy * radius), radius);
            self.push(child, energy);
        }
        self.particles.remove(index);
        true
    }

    /// Give every particle alive at the start of the pass one chance to decompose
    ///
    /// Children created during the pass are appended after the bound and are
    /// not eligible until the next pass. Returns the number of decompositions.
    pub fn decomposition_pass<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f64) -> usize {
        let start_count = self.particles.len();
        let mut index = 0;
        let mut decomposed = 0;
        for _ in 0..start_count {
            let draw: f64 = rng.random();
            if draw <= rate && self.decompose(index) {
                // The next pre-existing particle slid into `index`
                decomposed += 1;
            } else {
                index += 1;
            }
        }
        if decomposed > 0 {
            log::debug!("{} particle(s) decomposed, {} live", decomposed, self.count());
        }
        decomposed
    }

    pub fn clear_all(&mut self) {
        self.particles.clear();
        self.previous_count = 0;
    }

    /// Compare the count against the previous check and remember it
    pub fn did_count_change(&mut self) -> bool {
        let count = self.particles.len();
        if count == self.previous_count {
            return false;
        }
        self.previous_count = count;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn store_with(particles: &[(f64, f64, f64, f64)]) -> ParticleStore {
        let mut store = ParticleStore::new();
        store.set_count(u32::try_from(particles.len()).unwrap());
        for (i, &(energy, radius, x, y)) in particles.iter().enumerate() {
            store.set_particle(i, Circle::new(DVec2::new(x, y), radius), energy);
        }
        store
    }

    #[test]
    fn test_set_count_and_fill() {
        let store = store_with(&[(0.5, 1.0, 0.0, 0.0), (1.0, 2.0, 10.0, 0.0)]);
        assert_eq!(store.count(), 2);
        assert_eq!(store.energy_of(1), Some(1.0));
        assert_eq!(store.position_of(0).unwrap().radius, 1.0);
        assert!(store.position_of(2).is_none());

        let mut store = store;
        store.set_count(0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_is_valid_ranges() {
        let c = |r: f64, x: f64| Circle::new(DVec2::new(x, 0.0), r);
        assert!(ParticleStore::is_valid(&c(1.0, 0.0), 0.5));
        assert!(ParticleStore::is_valid(&c(R_PARTICULE_MIN, DMAX), 0.0));
        assert!(!ParticleStore::is_valid(&c(0.2, 0.0), 0.5));
        assert!(!ParticleStore::is_valid(&c(4.5, 0.0), 0.5));
        assert!(!ParticleStore::is_valid(&c(1.0, 0.0), 1.5));
        assert!(!ParticleStore::is_valid(&c(1.0, 0.0), -0.1));
        assert!(!ParticleStore::is_valid(&c(1.0, 21.0), 0.5));
    }

    #[test]
    fn test_collides_with_earlier_reports_first() {
        let store = store_with(&[
            (0.5, 1.0, 0.0, 0.0),
            (0.5, 1.0, 5.0, 0.0),
            (0.5, 1.0, 1.0, 0.0),
        ]);
        assert_eq!(store.collides_with_earlier(0), None);
        assert_eq!(store.collides_with_earlier(1), None);
        assert_eq!(store.collides_with_earlier(2), Some(0));
    }

    #[test]
    fn test_remove_keeps_order_and_ids() {
        let mut store = store_with(&[
            (0.1, 1.0, 0.0, 0.0),
            (0.2, 1.0, 5.0, 0.0),
            (0.3, 1.0, 10.0, 0.0),
        ]);
        let last_id = store.get(2).unwrap().id;
        let removed = store.remove(1).unwrap();
        assert_eq!(removed.energy, 0.2);
        assert_eq!(store.count(), 2);
        assert_eq!(store.index_of(last_id), Some(1));
        assert!(!store.contains(removed.id));
        assert!(store.remove(5).is_none());
    }

    #[test]
    fn test_decompose_splits_into_four() {
        let mut store = store_with(&[(0.8, 2.0, 1.0, -1.0)]);
        let parent_id = store.get(0).unwrap().id;
        assert!(store.decompose(0));
        assert_eq!(store.count(), 4);
        assert!(!store.contains(parent_id));

        let r = 2.0 * R_PARTICULE_FACTOR;
        for p in store.iter() {
            assert!((p.circle.radius - r).abs() < 1e-12);
            assert!((p.energy - 0.2).abs() < 1e-12);
            assert!(((p.circle.center.x - 1.0).abs() - r).abs() < 1e-12);
            assert!(((p.circle.center.y + 1.0).abs() - r).abs() < 1e-12);
        }
        for i in 0..store.count() {
            assert_eq!(store.collides_with_earlier(i), None);
        }
    }

    #[test]
    fn test_decompose_refused_for_small_particle() {
        // 0.7 * 0.4142 < 0.3
        let mut store = store_with(&[(0.8, 0.7, 0.0, 0.0)]);
        assert!(!store.decompose(0));
        assert_eq!(store.count(), 1);
        assert_eq!(store.position_of(0).unwrap().radius, 0.7);
    }

    #[test]
    fn test_decomposition_pass_bound() {
        // Rate 1.0: every pre-existing particle splits exactly once
        let mut store = store_with(&[(1.0, 4.0, -10.0, 0.0), (1.0, 4.0, 10.0, 0.0)]);
        let mut rng = Pcg32::seed_from_u64(7);
        let n = store.decomposition_pass(&mut rng, 1.0);
        assert_eq!(n, 2);
        assert_eq!(store.count(), 8);
        assert!(store.iter().all(|p| (p.energy - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_decomposition_pass_zero_rate() {
        let mut store = store_with(&[(1.0, 4.0, 0.0, 0.0)]);
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(store.decomposition_pass(&mut rng, 0.0), 0);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_did_count_change() {
        let mut store = store_with(&[(0.5, 1.0, 0.0, 0.0), (0.5, 1.0, 5.0, 0.0)]);
        assert!(!store.did_count_change());
        store.remove(0);
        assert!(store.did_count_change());
        assert!(!store.did_count_change());
    }

    #[test]
    fn test_total_energy() {
        let store = store_with(&[(0.5, 1.0, 0.0, 0.0), (0.25, 1.0, 5.0, 0.0)]);
        assert!((store.total_energy() - 0.75).abs() < 1e-12);
    }
}
