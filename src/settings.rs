//! Run settings
//!
//! Persisted as JSON, separate from scenario files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DECOMPOSITION_RATE, RECORD_FILE};
use crate::error::SettingsError;

/// Simulation run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for decomposition draws
    pub seed: u64,
    /// Per-tick decomposition probability
    pub decomposition_rate: f64,
    /// Where recorded rates are written
    pub record_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            decomposition_rate: DECOMPOSITION_RATE,
            record_path: PathBuf::from(RECORD_FILE),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file (missing fields take defaults)
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "seed": 17 }"#).unwrap();
        assert_eq!(settings.seed, 17);
        assert_eq!(settings.decomposition_rate, DECOMPOSITION_RATE);
        assert_eq!(settings.record_path, PathBuf::from(RECORD_FILE));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("decontam-settings-{}.json", std::process::id()));
        let settings = Settings {
            seed: 5,
            decomposition_rate: 0.0,
            record_path: PathBuf::from("rates.dat"),
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_json_reported() {
        let err = serde_json::from_str::<Settings>("{ seed: }").unwrap_err();
        assert!(matches!(SettingsError::from(err), SettingsError::Json(_)));
    }
}
