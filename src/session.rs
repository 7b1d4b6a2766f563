//! Interactive session around the simulation
//!
//! Mirrors the controls of the simulator window without owning a window:
//! open/save, start/stop, single step, recording, control mode, robot
//! selection by click and speed changes by arrow keys. A front end calls
//! `idle` from its idle loop and forwards input events.

use std::io;
use std::path::{Path, PathBuf};

use glam::DVec2;

use crate::consts::{DELTA_VROT, DELTA_VTRAN};
use crate::error::ScenarioError;
use crate::record::Recorder;
use crate::scenario;
use crate::settings::Settings;
use crate::sim::{RateTracker, SimState, initial_assignment, tick};

/// Who drives the robots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    Automatic,
    /// One robot at a time can be selected and steered by hand
    Manual,
}

/// Directional input for the manual robot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    /// Turn faster counter-clockwise
    Left,
    Right,
    /// Drive faster forward
    Up,
    Down,
}

/// Simulation plus the state of its controls
#[derive(Debug)]
pub struct Session {
    pub state: SimState,
    rate: RateTracker,
    /// Ticks since recording was last toggled
    turn: u64,
    running: bool,
    mode: ControlMode,
    recorder: Option<Recorder>,
    record_path: PathBuf,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: SimState::new(settings.seed).with_decomposition_rate(settings.decomposition_rate),
            rate: RateTracker::new(),
            turn: 0,
            running: false,
            mode: ControlMode::Automatic,
            recorder: None,
            record_path: settings.record_path.clone(),
        }
    }

    /// Replace the current scenario with the file at `path`
    ///
    /// A rejected file leaves an empty scenario. The decomposition RNG
    /// restarts from the session seed on every open.
    pub fn open(&mut self, path: &Path) -> Result<(), ScenarioError> {
        self.rate = RateTracker::new();
        self.turn = 0;
        self.state.clear();
        self.state.reseed(self.state.seed);
        scenario::load_into(&mut self.state, path)?;
        initial_assignment(&mut self.state);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        scenario::save_file(&self.state, path)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start or stop continuous advancement; stopping also ends recording
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        if self.running {
            log::info!("Simulation started");
        } else {
            log::info!("Simulation stopped");
            self.recorder = None;
        }
        self.running
    }

    /// Advance a single tick while stopped
    pub fn step(&mut self) -> bool {
        if self.running || !self.rate.is_running() {
            return false;
        }
        self.advance();
        true
    }

    /// Idle-loop callback
    ///
    /// Returns whether a tick ran.
    pub fn idle(&mut self) -> bool {
        if self.mode == ControlMode::Automatic {
            self.deselect_all();
        }
        if !self.running || !self.rate.is_running() {
            return false;
        }
        self.advance();
        true
    }

    fn advance(&mut self) {
        if self.turn == 0 {
            self.rate.capture_initial(&self.state);
        }
        tick(&mut self.state);
        self.rate.update(&self.state);
        self.turn += 1;

        if let Some(recorder) = &mut self.recorder
            && let Err(e) = recorder.append(self.turn, self.rate.rate)
        {
            log::warn!("Recording to {:?} failed: {}", recorder.path(), e);
            self.recorder = None;
        }
    }

    /// Toggle recording; the turn counter restarts either way
    pub fn set_recording(&mut self, on: bool) -> io::Result<()> {
        self.turn = 0;
        self.recorder = if on {
            Some(Recorder::create(&self.record_path)?)
        } else {
            None
        };
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn rate(&self) -> &RateTracker {
        &self.rate
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        if mode != self.mode {
            log::info!("Control mode: {:?}", mode);
        }
        self.mode = mode;
        if mode == ControlMode::Automatic {
            self.deselect_all();
        }
    }

    fn deselect_all(&mut self) {
        for index in 0..self.state.robots.count() {
            if self.state.robots.is_manual(index) {
                self.state.robots.deselect(index);
            }
        }
    }

    /// Select the robot under `point`, or release it if it was already selected
    pub fn click(&mut self, point: DVec2) {
        if self.mode != ControlMode::Manual {
            return;
        }
        let previous = self.state.robots.manual_index();
        self.deselect_all();
        if let Some(hit) = self.state.robot_at(point)
            && Some(hit) != previous
        {
            self.state.robots.select(hit);
        }
    }

    /// Adjust the manual robot's speeds
    pub fn key(&mut self, arrow: Arrow) {
        let Some(index) = self.state.robots.manual_index() else {
            return;
        };
        let robots = &mut self.state.robots;
        match arrow {
            Arrow::Left => robots.adjust_rotation_speed(index, DELTA_VROT),
            Arrow::Right => robots.adjust_rotation_speed(index, -DELTA_VROT),
            Arrow::Up => robots.adjust_translation_speed(index, DELTA_VTRAN),
            Arrow::Down => robots.adjust_translation_speed(index, -DELTA_VTRAN),
        }
    }

    /// (translation, rotation) speeds of the manual robot
    pub fn manual_speeds(&self) -> Option<(f64, f64)> {
        let index = self.state.robots.manual_index()?;
        let robot = self.state.robots.get(index)?;
        Some((robot.translation_speed, robot.rotation_speed))
    }
}
