//! Greedy goal assignment
//!
//! Particles are served largest first, each by the free robot with the
//! smallest estimated reach time. The estimate uses the nominal maximum
//! speeds, not a robot's current ones.

use super::geometry::{Circle, angular_offset, distance};
use super::particle::{ParticleId, ParticleStore};
use super::robot::RobotStore;
use crate::consts::{VROT_MAX, VTRAN_MAX};

/// Estimated time for a robot to reach a particle: straight-line travel plus turning
pub fn estimated_time(robots: &RobotStore, robot: usize, particle: &Circle) -> f64 {
    let Some(r) = robots.get(robot) else {
        return f64::INFINITY;
    };
    let turn = angular_offset(r.position(), r.orientation, particle.center).unwrap_or(0.0);
    distance(r.position(), particle.center) / VTRAN_MAX + turn.abs() / VROT_MAX
}

/// Particle ids sorted by ascending radius (ties keep store order)
fn by_radius(particles: &ParticleStore) -> Vec<(ParticleId, f64)> {
    let mut sorted: Vec<_> = particles.iter().map(|p| (p.id, p.circle.radius)).collect();
    // Insertion sort: stable and the lists are short
    for i in 1..sorted.len() {
        let mut j = i;
        while j > 0 && sorted[j - 1].1 > sorted[j].1 {
            sorted.swap(j - 1, j);
            j -= 1;
        }
    }
    sorted
}

/// Hand particle `id` to the quickest free robot; lowest index wins ties
fn assign_nearest(robots: &mut RobotStore, particles: &ParticleStore, id: ParticleId) {
    let Some(target) = particles.find(id) else {
        return;
    };
    let mut best: Option<(usize, f64)> = None;
    for (index, robot) in robots.iter().enumerate() {
        if robot.occupied {
            continue;
        }
        let time = estimated_time(robots, index, &target.circle);
        if best.is_none_or(|(_, t)| time < t) {
            best = Some((index, time));
        }
    }
    if let Some((index, _)) = best {
        robots.assign(index, id);
    }
}

/// Recompute every robot's target from scratch
///
/// With at least as many particles as robots, each robot gets one of the
/// largest particles. With fewer, every particle is assigned and the
/// leftover robots are then sent to the smallest particles as spares,
/// cycling through them if robots outnumber particles more than twice.
pub fn assign_goals(robots: &mut RobotStore, particles: &ParticleStore) {
    robots.release_all();
    let sorted = by_radius(particles);
    let nb_part = sorted.len();
    let nb_robot = robots.count();
    if nb_part == 0 || nb_robot == 0 {
        return;
    }

    for &(id, _) in sorted.iter().rev().take(nb_robot.min(nb_part)) {
        assign_nearest(robots, particles, id);
    }

    if nb_part < nb_robot {
        for k in 0..nb_robot - nb_part {
            let (id, _) = sorted[k % nb_part];
            assign_nearest(robots, particles, id);
        }
    }
    log::debug!("goals assigned: {} robot(s), {} particle(s)", nb_robot, nb_part);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn setup(robots: &[(f64, f64, f64)], parts: &[(f64, f64, f64)]) -> (RobotStore, ParticleStore) {
        let mut r = RobotStore::new();
        r.set_count(u32::try_from(robots.len()).unwrap());
        for (i, &(x, y, a)) in robots.iter().enumerate() {
            r.set_robot(i, DVec2::new(x, y), a);
        }
        let mut p = ParticleStore::new();
        p.set_count(u32::try_from(parts.len()).unwrap());
        for (i, &(radius, x, y)) in parts.iter().enumerate() {
            p.set_particle(i, Circle::new(DVec2::new(x, y), radius), 0.5);
        }
        (r, p)
    }

    fn targets(robots: &RobotStore, particles: &ParticleStore) -> Vec<Option<usize>> {
        robots
            .iter()
            .map(|r| r.target.and_then(|id| particles.index_of(id)))
            .collect()
    }

    #[test]
    fn test_single_robot_single_particle() {
        let (mut r, p) = setup(&[(0.0, 0.0, 0.0)], &[(1.0, 5.0, 0.0)]);
        assign_goals(&mut r, &p);
        assert_eq!(targets(&r, &p), vec![Some(0)]);
        assert!(r.get(0).unwrap().occupied);
    }

    #[test]
    fn test_largest_particle_gets_nearest_robot() {
        // Big particle on the right, small one on the left
        let (mut r, p) = setup(
            &[(-3.0, 0.0, 0.0), (3.0, 0.0, 0.0)],
            &[(0.5, -8.0, 0.0), (2.0, 8.0, 0.0)],
        );
        assign_goals(&mut r, &p);
        assert_eq!(targets(&r, &p), vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_more_particles_than_robots_serves_largest() {
        let (mut r, p) = setup(
            &[(0.0, 0.0, 0.0)],
            &[(0.5, 5.0, 0.0), (3.0, -10.0, 10.0), (1.0, 5.0, 5.0)],
        );
        assign_goals(&mut r, &p);
        assert_eq!(targets(&r, &p), vec![Some(1)]);
    }

    #[test]
    fn test_spare_robots_take_smallest() {
        let (mut r, p) = setup(
            &[(0.0, 0.0, 0.0), (0.0, 3.0, 0.0), (0.0, -3.0, 0.0)],
            &[(2.0, 10.0, 0.0), (0.5, -10.0, 0.0)],
        );
        assign_goals(&mut r, &p);
        let t = targets(&r, &p);
        assert!(t.iter().all(Option::is_some));
        assert_eq!(t.iter().filter(|x| **x == Some(1)).count(), 2);
        assert_eq!(t.iter().filter(|x| **x == Some(0)).count(), 1);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let (mut r, p) = setup(&[(0.0, 2.0, 0.0), (0.0, -2.0, 0.0)], &[(1.0, 6.0, 0.0)]);
        assign_goals(&mut r, &p);
        // Both robots are equally far; robot 0 wins, robot 1 becomes a spare
        assert_eq!(r.get(0).unwrap().target, Some(p.get(0).unwrap().id));
    }

    #[test]
    fn test_no_particles_frees_everyone() {
        let (mut r, p) = setup(&[(0.0, 0.0, 0.0)], &[(1.0, 5.0, 0.0)]);
        assign_goals(&mut r, &p);
        let (_, empty) = setup(&[], &[]);
        assign_goals(&mut r, &empty);
        assert!(!r.get(0).unwrap().occupied);
        assert!(r.get(0).unwrap().target.is_none());
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let robots = [(0.0, 0.0, 0.3), (4.0, 4.0, -1.0), (-6.0, 2.0, 2.0)];
        let parts = [(1.0, 8.0, 8.0), (1.0, -8.0, 3.0), (2.5, 0.0, -9.0), (0.4, 3.0, 0.0)];
        let (mut r1, p1) = setup(&robots, &parts);
        let (mut r2, p2) = setup(&robots, &parts);
        assign_goals(&mut r1, &p1);
        assign_goals(&mut r2, &p2);
        assert_eq!(targets(&r1, &p1), targets(&r2, &p2));
    }
}
