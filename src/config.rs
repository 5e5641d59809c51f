use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::chart::ColorMode;
use crate::dashboard::{DETAILED_SAMPLE_INTERVAL, DashboardSettings, MIN_VALID_LAP_DISTANCE_M};
use crate::errors::LaptrackError;
use crate::laps::store::FileBasedStore;

const CONFIG_DIR_NAME: &str = "laptrack";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Lap store folder, the platform data folder when unset
    pub store_dir: Option<PathBuf>,
    pub color_mode: ColorMode,
    pub min_valid_lap_distance_m: f64,
    pub detailed_sample_interval: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            color_mode: ColorMode::default(),
            min_valid_lap_distance_m: MIN_VALID_LAP_DISTANCE_M,
            detailed_sample_interval: DETAILED_SAMPLE_INTERVAL,
        }
    }
}

/// Settings to change, fields left `None` keep their current value
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigUpdate {
    pub store_dir: Option<PathBuf>,
    pub color_mode: Option<ColorMode>,
    pub min_valid_lap_distance_m: Option<f64>,
    pub detailed_sample_interval: Option<usize>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the user config, `None` when there is no config file yet
    pub fn from_local_file() -> Result<Option<Self>, LaptrackError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, LaptrackError> {
        if !path.exists() {
            return Ok(None);
        }
        debug!("Loading config from {:?}", path);
        let file = File::open(path).map_err(|e| LaptrackError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| LaptrackError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), LaptrackError> {
        let config_path = Self::config_path().ok_or(LaptrackError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), LaptrackError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LaptrackError::ConfigIOError { source: e })?;
        }

        let file = File::create(path).map_err(|e| LaptrackError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| LaptrackError::ConfigSerializeError { source: e })
    }

    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(dir) = update.store_dir {
            self.store_dir = Some(dir);
        }
        if let Some(mode) = update.color_mode {
            self.color_mode = mode;
        }
        if let Some(distance) = update.min_valid_lap_distance_m {
            self.min_valid_lap_distance_m = distance;
        }
        if let Some(interval) = update.detailed_sample_interval {
            self.detailed_sample_interval = interval;
        }
    }

    /// The configured store folder, falling back to the platform default
    pub fn store_path(&self) -> Result<PathBuf, LaptrackError> {
        match &self.store_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileBasedStore::default_store_path(),
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            min_valid_lap_distance_m: self.min_valid_lap_distance_m,
            detailed_sample_interval: self.detailed_sample_interval,
        }
    }
}
