//! Decontamination rate log
//!
//! One `<turn> <rate>` line per recorded tick, appended as the run goes.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only rate log
#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    file: File,
}

impl Recorder {
    /// Start a fresh log, truncating any previous content
    pub fn create(path: &Path) -> io::Result<Self> {
        File::create(path)?;
        let file = OpenOptions::new().append(true).open(path)?;
        log::info!("Recording to {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, turn: u64, rate: f64) -> io::Result<()> {
        writeln!(self.file, "{} {:.6}", turn, rate)?;
        self.file.flush()
    }
}
