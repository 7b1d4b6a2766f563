//! Scene emission for an external renderer
//!
//! The simulation holds no rendering state. A frame is a list of circle
//! and segment primitives pushed into a `DrawSink`, in world coordinates.

use glam::DVec2;

use crate::consts::{DMAX, R_ROBOT};
use crate::displace;
use crate::sim::SimState;

/// RGB color, components in 0-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

const FRAME_WEIGHT: f64 = 5.0;
const ROBOT_WEIGHT: f64 = 2.0;
const PARTICLE_WEIGHT: f64 = 1.0;
/// Radius of the dot marking a robot's centre
const CENTER_DOT_RADIUS: f64 = 0.1;

/// Receiver of draw primitives
pub trait DrawSink {
    fn draw_circle(&mut self, center: DVec2, radius: f64, color: Color, filled: bool, line_weight: f64);
    fn draw_segment(&mut self, a: DVec2, b: DVec2, color: Color, line_weight: f64);
}

/// Emit the arena frame, every robot and every particle
pub fn render<S: DrawSink + ?Sized>(state: &SimState, sink: &mut S) {
    let corners = [
        DVec2::new(-DMAX, -DMAX),
        DVec2::new(DMAX, -DMAX),
        DVec2::new(DMAX, DMAX),
        DVec2::new(-DMAX, DMAX),
    ];
    for i in 0..corners.len() {
        let next = corners[(i + 1) % corners.len()];
        sink.draw_segment(corners[i], next, Color::BLACK, FRAME_WEIGHT);
    }

    for robot in state.robots.iter() {
        let center = robot.position();
        let outline = if robot.manual { Color::RED } else { Color::BLACK };
        sink.draw_circle(center, robot.circle.radius, outline, false, ROBOT_WEIGHT);
        sink.draw_segment(
            center,
            displace(center, robot.orientation, R_ROBOT),
            Color::BLACK,
            ROBOT_WEIGHT,
        );
        sink.draw_circle(center, CENTER_DOT_RADIUS, Color::RED, true, ROBOT_WEIGHT);
    }

    for particle in state.particles.iter() {
        let c = &particle.circle;
        sink.draw_circle(c.center, c.radius, Color::GREY, true, PARTICLE_WEIGHT);
    }
}
