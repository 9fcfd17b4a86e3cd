use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{LapDeltaError, analysis::DEFAULT_SEGMENT_COUNT};

const CONFIG_DIR_NAME: &str = "lapdelta";
const CONFIG_FILE_NAME: &str = "config.json";

/// Padding, in seconds, added above and below the delta curves
pub const DELTA_PADDING_S: f64 = 0.1;
/// Distance between a corner and its label on the track map
pub const CORNER_LABEL_OFFSET: f64 = 500.;
/// First season in which every driver has an individual color
pub const DRIVER_COLOR_FROM_YEAR: i32 = 2024;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub segment_count: usize,
    pub delta_padding_s: f64,
    pub corner_label_offset: f64,
    pub driver_color_from_year: i32,
    /// Driver abbreviation to color, e.g. "VER" -> "#3671C6"
    pub driver_colors: HashMap<String, String>,
    /// Team name to color, keys are matched case-insensitively
    pub team_colors: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            segment_count: DEFAULT_SEGMENT_COUNT,
            delta_padding_s: DELTA_PADDING_S,
            corner_label_offset: CORNER_LABEL_OFFSET,
            driver_color_from_year: DRIVER_COLOR_FROM_YEAR,
            driver_colors: HashMap::new(),
            team_colors: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, LapDeltaError> {
        Ok(dirs::config_dir()
            .ok_or(LapDeltaError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Loads the user's config file, `None` if there is none yet
    pub fn from_local_file() -> Result<Option<Self>, LapDeltaError> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::from_path(&config_path).map(Some)
        } else {
            debug!("No config file at {:?}", config_path);
            Ok(None)
        }
    }

    pub fn from_path(config_path: &Path) -> Result<Self, LapDeltaError> {
        let file = std::fs::File::open(config_path)
            .map_err(|e| LapDeltaError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| LapDeltaError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), LapDeltaError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), LapDeltaError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LapDeltaError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| LapDeltaError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| LapDeltaError::ConfigSerializeError { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = AppConfig {
            segment_count: 24,
            ..Default::default()
        };
        config
            .driver_colors
            .insert("LEC".to_string(), "#E8002D".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::from_path(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"segment_count": 12}"#).unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert_eq!(config.segment_count, 12);
        assert_eq!(config.delta_padding_s, DELTA_PADDING_S);
        assert_eq!(config.driver_color_from_year, 2024);
    }

    #[test]
    fn test_malformed_config_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            AppConfig::from_path(&path),
            Err(LapDeltaError::ConfigSerializeError { .. })
        ));
    }
}
