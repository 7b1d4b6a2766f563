//! Robot store and robot motion
//!
//! The fleet size is fixed once a scenario is loaded. Autonomous robots
//! steer toward their assigned particle; a manual robot follows the speeds
//! set by the user. Every move goes through collision correction so a
//! robot never ends a tick overlapping another body.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{
    Circle, angle, angular_offset, circles_collide, distance, is_aligned, resolve_overlap_distance,
};
use super::particle::{ParticleId, ParticleStore};
use crate::consts::*;
use crate::{displace, normalize_angle};

/// A decontamination robot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    /// Stable 1-based number
    pub id: u32,
    pub circle: Circle,
    /// Heading in (-π, π]
    pub orientation: f64,
    pub rotation_speed: f64,
    pub translation_speed: f64,
    pub manual: bool,
    pub occupied: bool,
    pub target: Option<ParticleId>,
}

impl Robot {
    pub fn new(id: u32, position: DVec2, orientation: f64) -> Self {
        Self {
            id,
            circle: Circle::new(position, R_ROBOT),
            orientation,
            rotation_speed: VROT_MAX,
            translation_speed: VTRAN_MAX,
            manual: false,
            occupied: false,
            target: None,
        }
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        self.circle.center
    }

    /// Rotate by `delta` and keep the heading normalized
    fn turn(&mut self, delta: f64) {
        self.orientation = normalize_angle(self.orientation + delta);
    }
}

/// Fixed-size robot collection
#[derive(Debug, Clone, Default)]
pub struct RobotStore {
    robots: Vec<Robot>,
}

impl RobotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            robots: Vec::with_capacity(capacity),
        }
    }

    /// Reset to `n` robots at the origin, to be placed with `set_robot`
    pub fn set_count(&mut self, n: u32) {
        self.robots = (1..=n).map(|id| Robot::new(id, DVec2::ZERO, 0.0)).collect();
    }

    /// Place robot `index` (0-based) and reset its control state
    pub fn set_robot(&mut self, index: usize, position: DVec2, orientation: f64) {
        assert!(index < self.robots.len(), "robot slot {index} out of range");
        let id = self.robots[index].id;
        self.robots[index] = Robot::new(id, position, orientation);
    }

    /// Append a robot and return its index
    ///
    /// Ids saturate at `u32::MAX`; scenario counts never get there.
    pub fn push(&mut self, position: DVec2, orientation: f64) -> usize {
        let index = self.robots.len();
        let id = u32::try_from(index + 1).unwrap_or(u32::MAX);
        self.robots.push(Robot::new(id, position, orientation));
        index
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.robots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Robot> {
        self.robots.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Robot> {
        self.robots.get(index)
    }

    pub fn position_of(&self, index: usize) -> Option<Circle> {
        self.robots.get(index).map(|r| r.circle)
    }

    pub fn orientation_of(&self, index: usize) -> Option<f64> {
        self.robots.get(index).map(|r| r.orientation)
    }

    pub fn is_manual(&self, index: usize) -> bool {
        self.robots.get(index).is_some_and(|r| r.manual)
    }

    /// Index of the robot under manual control, if any
    pub fn manual_index(&self) -> Option<usize> {
        self.robots.iter().position(|r| r.manual)
    }

    /// Enter manual mode with both speeds at zero
    pub fn select(&mut self, index: usize) {
        if let Some(robot) = self.robots.get_mut(index) {
            robot.manual = true;
            robot.rotation_speed = 0.0;
            robot.translation_speed = 0.0;
        }
    }

    /// Leave manual mode, restoring default speeds
    pub fn deselect(&mut self, index: usize) {
        if let Some(robot) = self.robots.get_mut(index) {
            robot.manual = false;
            robot.rotation_speed = VROT_MAX;
            robot.translation_speed = VTRAN_MAX;
        }
    }

    pub fn adjust_rotation_speed(&mut self, index: usize, delta: f64) {
        if let Some(robot) = self.robots.get_mut(index) {
            robot.rotation_speed = (robot.rotation_speed + delta).clamp(-VROT_MAX, VROT_MAX);
        }
    }

    pub fn adjust_translation_speed(&mut self, index: usize, delta: f64) {
        if let Some(robot) = self.robots.get_mut(index) {
            robot.translation_speed =
                (robot.translation_speed + delta).clamp(-VTRAN_MAX, VTRAN_MAX);
        }
    }

    /// First lower-indexed robot overlapping robot `index`
    pub fn collides_with_earlier(&self, index: usize) -> Option<usize> {
        let robot = self.robots.get(index)?;
        self.robots[..index]
            .iter()
            .position(|other| circles_collide(&robot.circle, &other.circle).0)
    }

    /// Highest-indexed robot overlapping `circle`
    pub fn collides_with_any_particle(&self, circle: &Circle) -> Option<usize> {
        self.robots
            .iter()
            .rposition(|robot| circles_collide(&robot.circle, circle).0)
    }

    pub fn clear_all(&mut self) {
        self.robots.clear();
    }

    /// Drop targets that no longer reference a live particle
    pub fn release_stale_targets(&mut self, particles: &ParticleStore) {
        for robot in &mut self.robots {
            if robot.target.is_some_and(|id| !particles.contains(id)) {
                robot.target = None;
                robot.occupied = false;
            }
        }
    }

    /// Mark every robot free
    pub fn release_all(&mut self) {
        for robot in &mut self.robots {
            robot.occupied = false;
            robot.target = None;
        }
    }

    /// Give robot `index` a target
    pub(crate) fn assign(&mut self, index: usize, target: ParticleId) {
        let robot = &mut self.robots[index];
        robot.occupied = true;
        robot.target = Some(target);
    }

    /// Steer an occupied robot toward its target for one tick
    pub fn move_autonomous(&mut self, index: usize, particles: &ParticleStore) {
        let Some(robot) = self.robots.get_mut(index) else {
            return;
        };
        if !robot.occupied {
            return;
        }
        let Some(target) = robot.target.and_then(|id| particles.find(id)) else {
            return;
        };
        let target_center = target.circle.center;
        let mut tentative = robot.position();
        let step = robot.rotation_speed * DELTA_T;

        match angular_offset(robot.position(), robot.orientation, target_center) {
            Some(offset) if offset.abs() > std::f64::consts::FRAC_PI_2 => {
                // Target behind: turn in place
                robot.turn(if offset > 0.0 { step } else { -step });
            }
            offset => {
                let offset = offset.unwrap_or(0.0);
                if offset.abs() <= step.abs() {
                    robot.orientation = angle(robot.position(), target_center);
                } else {
                    robot.turn(if offset > 0.0 { step } else { -step });
                }
                tentative = displace(
                    tentative,
                    robot.orientation,
                    robot.translation_speed * DELTA_T,
                );
            }
        }

        self.correct_collision(index, tentative, particles);
    }

    /// Apply the user-set speeds of a manual robot for one tick
    pub fn move_manual(&mut self, index: usize, particles: &ParticleStore) {
        let Some(robot) = self.robots.get_mut(index) else {
            return;
        };
        robot.turn(robot.rotation_speed * DELTA_T);
        let tentative = displace(
            robot.position(),
            robot.orientation,
            robot.translation_speed * DELTA_T,
        );
        self.correct_collision(index, tentative, particles);
    }

    /// Pull a tentative position back until it touches, not overlaps, every obstacle
    ///
    /// The robot retreats along its line of travel. A particle it runs into
    /// becomes its target.
    pub fn correct_collision(
        &mut self,
        index: usize,
        tentative: DVec2,
        particles: &ParticleStore,
    ) {
        let Some(start) = self.robots.get(index).map(|r| r.position()) else {
            return;
        };
        let mut circle = Circle::new(tentative, R_ROBOT);

        let obstacles = self
            .robots
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .map(|(_, other)| (other.circle, None::<ParticleId>))
            .chain(particles.iter().map(|p| (p.circle, Some(p.id))));

        let mut new_target = None;
        for (obstacle, particle) in obstacles {
            if circles_collide(&circle, &obstacle).0 {
                circle.center = retreat(start, circle.center, &obstacle);
                if particle.is_some() {
                    new_target = particle;
                }
            }
        }

        let robot = &mut self.robots[index];
        robot.circle = circle;
        if new_target.is_some() {
            robot.target = new_target;
        }
    }

    /// Remove the target particle if the robot touches it and faces it
    ///
    /// Returns the removed particle id.
    pub fn try_decontaminate(
        &self,
        index: usize,
        particles: &mut ParticleStore,
    ) -> Option<ParticleId> {
        let robot = self.robots.get(index)?;
        if !robot.occupied {
            return None;
        }
        let target = particles.find(robot.target?)?;
        let reach = target.circle.radius + robot.circle.radius + EPSIL_ZERO;
        if distance(robot.position(), target.circle.center) <= reach
            && is_aligned(robot.position(), robot.orientation, target.circle.center)
        {
            let id = target.id;
            particles.remove_id(id);
            log::debug!("robot {} decontaminated particle {}", robot.id, id.0);
            return Some(id);
        }
        None
    }
}

/// Position on the segment `start`→`tentative` where the robot first touches `obstacle`
///
/// Falls back to `start` when the contact point cannot be computed or would
/// lie beyond the intended travel.
fn retreat(start: DVec2, tentative: DVec2, obstacle: &Circle) -> DVec2 {
    let travelled = distance(start, tentative);
    let new_dist = resolve_overlap_distance(
        travelled,
        distance(tentative, obstacle.center),
        distance(start, obstacle.center),
        R_ROBOT + obstacle.radius,
    )
    .filter(|d| d.abs() <= travelled)
    .unwrap_or(0.0);
    start + (tentative - start).normalize_or_zero() * new_dist
}
