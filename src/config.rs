use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::advisor::PerformanceThresholds;
use crate::errors::AdvisorError;
use crate::scenario::BaseCatalog;

const APP_DIR_NAME: &str = "relay-advisor";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the parameter, feature and metrics CSV files
    pub data_dir: Option<PathBuf>,
    pub thresholds: PerformanceThresholds,
    /// Replaces the built-in per-base configuration when present
    pub catalog: Option<BaseCatalog>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// `Ok(None)` when no config file has been saved yet.
    pub fn from_local_file() -> Result<Option<Self>, AdvisorError> {
        match Self::config_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(None),
        }
    }

    pub fn from_file(path: &Path) -> Result<Option<Self>, AdvisorError> {
        if !path.exists() {
            return Ok(None);
        }
        debug!("Loading config from {}", path.display());
        let file =
            std::fs::File::open(path).map_err(|e| AdvisorError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| AdvisorError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), AdvisorError> {
        let config_path = Self::config_path().ok_or(AdvisorError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AdvisorError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AdvisorError::ConfigIOError { source: e })?;
            }
        }

        let file =
            std::fs::File::create(path).map_err(|e| AdvisorError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| AdvisorError::ConfigSerializeError { source: e })
    }

    /// Replace the data directory when one is given, keeping the rest of the settings.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        self
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> BaseCatalog {
        self.catalog.clone().unwrap_or_default()
    }
}
