//! JSON configuration of the facade and the CLI.

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use vision_boundary_calib::{CalibFlags, PoseMethod};
use vision_boundary_core::{LogLevels, Source};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_error_description_capacity() -> usize {
    255
}

fn default_wait_timeout_ms() -> u32 {
    5000
}

fn default_buffer_count() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fixed_terms() -> Vec<FixedTerm> {
    vec![FixedTerm::K3, FixedTerm::K4, FixedTerm::K5, FixedTerm::K6]
}

/// Distortion terms that can be held fixed during calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedTerm {
    K3,
    K4,
    K5,
    K6,
}

impl FixedTerm {
    pub fn flag(self) -> CalibFlags {
        match self {
            FixedTerm::K3 => CalibFlags::FIX_K3,
            FixedTerm::K4 => CalibFlags::FIX_K4,
            FixedTerm::K5 => CalibFlags::FIX_K5,
            FixedTerm::K6 => CalibFlags::FIX_K6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseSolver {
    #[default]
    Ippe,
    Epnp,
}

impl From<PoseSolver> for PoseMethod {
    fn from(solver: PoseSolver) -> Self {
        match solver {
            PoseSolver::Ippe => PoseMethod::Ippe,
            PoseSolver::Epnp => PoseMethod::Epnp,
        }
    }
}

/// Calibration settings. All higher-order terms are fixed by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default = "default_fixed_terms")]
    pub fixed_terms: Vec<FixedTerm>,
    #[serde(default)]
    pub pose_solver: PoseSolver,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            fixed_terms: default_fixed_terms(),
            pose_solver: PoseSolver::default(),
        }
    }
}

impl CalibrationConfig {
    pub fn flags(&self) -> CalibFlags {
        self.fixed_terms
            .iter()
            .fold(CalibFlags::NONE, |acc, term| acc.union(term.flag()))
    }
}

/// Settings shared by the facade wrappers and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Size of the buffer handed to calls that copy an exception text.
    #[serde(default = "default_error_description_capacity")]
    pub error_description_capacity: usize,
    #[serde(default = "default_wait_timeout_ms")]
    pub default_wait_timeout_ms: u32,
    /// Buffers registered per stream grabber.
    #[serde(default = "default_buffer_count")]
    pub buffer_count: usize,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            error_description_capacity: default_error_description_capacity(),
            default_wait_timeout_ms: default_wait_timeout_ms(),
            buffer_count: default_buffer_count(),
            calibration: CalibrationConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl BoundaryConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.default_wait_timeout_ms))
    }

    /// Most verbose level `log_level` enables for any source.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_levels().max()
    }

    /// Per-source levels, e.g. `"info,camera=debug,external=off"`.
    pub fn log_levels(&self) -> LogLevels {
        LogLevels::parse(&self.log_level)
    }
}
