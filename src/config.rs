// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::PipelineBackend;
use crate::backends::synthetic::SyntheticConfig;
use crate::constants::DEFAULT_SIMULATED_FRAME_RATE;
use crate::errors::{AppError, AppResult};
use crate::viewer::LoopConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name under the user's config dir
pub const CONFIG_DIR_NAME: &str = "depth-viewer";
/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Persistent viewer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred depth decoding pipeline
    pub pipeline: PipelineBackend,
    /// Serial of the device to open (default device if unset)
    pub serial: Option<String>,
    /// Devices reported by the synthetic driver
    pub simulated_devices: usize,
    /// Pipeline backends the synthetic driver supports
    pub simulated_pipelines: Vec<PipelineBackend>,
    /// Synthetic acquisition rate in frame sets per second
    pub simulated_frame_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineBackend::OpenCl,
            serial: None,
            simulated_devices: 1,
            simulated_pipelines: PipelineBackend::ALL.to_vec(),
            simulated_frame_rate: DEFAULT_SIMULATED_FRAME_RATE,
        }
    }
}

impl Config {
    /// Default location: `<config_dir>/depth-viewer/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file yields defaults silently; an unreadable or invalid one
    /// is logged and also yields defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                debug!("No config directory available, using defaults");
                return Self::default();
            }
        };

        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        }

        match Self::read(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring config file");
                Self::default()
            }
        }
    }

    /// Read and parse a config file
    pub fn read(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse JSON config contents
    pub fn parse(contents: &str) -> AppResult<Self> {
        serde_json::from_str(contents).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Settings for the synthetic driver
    pub fn synthetic_config(&self) -> SyntheticConfig {
        SyntheticConfig {
            devices: self.simulated_devices,
            pipelines: self.simulated_pipelines.clone(),
            frame_rate: self.simulated_frame_rate,
        }
    }

    /// Settings for the capture-and-display loop
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            pipeline: self.pipeline,
            serial: self.serial.clone(),
        }
    }
}
