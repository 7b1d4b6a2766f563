//! Scenario files
//!
//! Plain text, one directive per line:
//!
//! ```text
//! <robot count>
//! <x> <y> <angle> [<x> <y> <angle> ...]
//! FIN_LISTE
//! <particle count>
//! <energy> <radius> <x> <y> [...]
//! FIN_LISTE
//! ```
//!
//! A count of 0 is followed directly by the next section. Lines starting
//! with `#` are comments.

pub mod parser;
pub mod writer;

pub use parser::{ParseState, parse_scenario, parse_str};
pub use writer::write_scenario;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::ScenarioError;
use crate::sim::{ParticleStore, RobotStore, SimState};

/// List terminator keyword
pub const FIN_LISTE: &str = "FIN_LISTE";

/// Read and validate a scenario file
pub fn load_file(path: &Path) -> Result<(RobotStore, ParticleStore), ScenarioError> {
    let file = File::open(path).map_err(|source| ScenarioError::FileMissing {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenario(BufReader::new(file))
}

/// Load a scenario into `state`
///
/// On failure the state is left empty, never partially loaded.
pub fn load_into(state: &mut SimState, path: &Path) -> Result<(), ScenarioError> {
    match load_file(path) {
        Ok((robots, particles)) => {
            log::info!(
                "Loaded {:?}: {} robot(s), {} particle(s)",
                path,
                robots.count(),
                particles.count()
            );
            state.replace(robots, particles);
            Ok(())
        }
        Err(e) => {
            log::warn!("Rejected {:?}: {}", path, e);
            state.clear();
            Err(e)
        }
    }
}

/// Write the current robots and particles to `path`
pub fn save_file(state: &SimState, path: &Path) -> Result<(), ScenarioError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_scenario(&mut out, &state.robots, &state.particles)?;
    out.flush()?;
    log::info!("Scenario saved to {:?}", path);
    Ok(())
}
