use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    BENCHMARK_STALL_FPS, DEFAULT_CHANGE_THRESHOLD, DEFAULT_FINGERPRINT_SIDE, DEFAULT_MIN_SIDE,
    INTERACTIVE_STALL_FPS, MAX_FINGERPRINT_SIDE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Interactive,
    Benchmark,
}

impl RunMode {
    pub fn default_stall_fps(self) -> f64 {
        match self {
            RunMode::Interactive => INTERACTIVE_STALL_FPS,
            RunMode::Benchmark => BENCHMARK_STALL_FPS,
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Interactive => write!(f, "interactive"),
            RunMode::Benchmark => write!(f, "benchmark"),
        }
    }
}

/// Every tunable of the tracking core, passed explicitly to each component.
///
/// Thresholds and minimum sizes have no universally correct value; they are
/// tuned per domain and persisted alongside a run as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub fingerprint_side: u32,
    pub change_threshold: u32,
    pub min_side: f64,
    /// `None` falls back to the mode's default floor.
    pub stall_fps_floor: Option<f64>,
    pub mode: RunMode,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            fingerprint_side: DEFAULT_FINGERPRINT_SIDE,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            min_side: DEFAULT_MIN_SIDE,
            stall_fps_floor: None,
            mode: RunMode::Benchmark,
        }
    }
}

impl TrackingConfig {
    pub fn for_mode(mode: RunMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn stall_fps(&self) -> f64 {
        self.stall_fps_floor
            .unwrap_or_else(|| self.mode.default_stall_fps())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FINGERPRINT_SIDE).contains(&self.fingerprint_side) {
            return Err(ConfigError::Invalid(format!(
                "fingerprint side must be between 1 and {MAX_FINGERPRINT_SIDE}, got {}",
                self.fingerprint_side
            )));
        }
        if !self.min_side.is_finite() || self.min_side < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "minimum box side must be a non-negative number, got {}",
                self.min_side
            )));
        }
        if let Some(floor) = self.stall_fps_floor {
            if !floor.is_finite() || floor < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "stall fps floor must be a non-negative number, got {floor}"
                )));
            }
        }
        Ok(())
    }

    /// Loads and validates a JSON config. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }
}
