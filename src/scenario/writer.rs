//! Scenario writer
//!
//! Emits the same line format the parser reads. A section with zero
//! entities is written as its count alone, with no data lines and no
//! `FIN_LISTE`, which the parser accepts.

use std::io::{self, Write};

use super::FIN_LISTE;
use crate::sim::{ParticleStore, RobotStore};

/// Write robots then particles
pub fn write_scenario<W: Write>(
    out: &mut W,
    robots: &RobotStore,
    particles: &ParticleStore,
) -> io::Result<()> {
    writeln!(out, "# Generated scenario")?;
    writeln!(out, "#")?;
    writeln!(out, "{}", robots.count())?;
    for robot in robots.iter() {
        let pos = robot.position();
        writeln!(out, "\t{} {} {}", pos.x, pos.y, robot.orientation)?;
    }
    if robots.count() > 0 {
        writeln!(out, "{FIN_LISTE}")?;
    }

    writeln!(out)?;
    writeln!(out, "{}", particles.count())?;
    for particle in particles.iter() {
        let c = &particle.circle;
        writeln!(
            out,
            "\t{} {} {} {}",
            particle.energy, c.radius, c.center.x, c.center.y
        )?;
    }
    if particles.count() > 0 {
        writeln!(out, "{FIN_LISTE}")?;
    }
    Ok(())
}

/// Serialize into a string
pub fn to_string(robots: &RobotStore, particles: &ParticleStore) -> String {
    let mut buf = Vec::new();
    write_scenario(&mut buf, robots, particles).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Circle;
    use glam::DVec2;

    #[test]
    fn test_layout() {
        let mut robots = RobotStore::new();
        robots.set_count(1);
        robots.set_robot(0, DVec2::new(1.5, -2.0), 0.25);
        let mut particles = ParticleStore::new();
        particles.set_count(1);
        particles.set_particle(0, Circle::new(DVec2::new(3.0, 4.0), 0.5), 1.0);

        let text = to_string(&robots, &particles);
        let significant: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        assert_eq!(
            significant,
            vec!["1", "1.5 -2 0.25", "FIN_LISTE", "1", "1 0.5 3 4", "FIN_LISTE"]
        );
    }

    #[test]
    fn test_empty_particle_section() {
        let mut robots = RobotStore::new();
        robots.set_count(1);
        robots.set_robot(0, DVec2::ZERO, 0.0);
        let text = to_string(&robots, &ParticleStore::new());
        assert!(text.trim_end().ends_with('0'));
        assert_eq!(text.matches(FIN_LISTE).count(), 1);
    }
}
