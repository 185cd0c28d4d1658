//! Per-world sync settings, persisted across runs.
//!
//! Stores the timezone, the weather data-source key, the convergence
//! strategy, and the clock value written back at world deactivation.

use bevy::prelude::*;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Default file name for config storage.
const CONFIG_FILE_NAME: &str = "config.json";

/// How the per-tick convergence moves the simulated clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConvergenceStrategy {
    /// Set the clock to the real-time target every tick. Zero drift;
    /// appropriate when the host's tick cadence is already smooth.
    #[default]
    Direct,
    /// Exponential approach toward the target. Absorbs sudden jumps — host
    /// pause, system clock change, zone reconfiguration — over several ticks
    /// instead of snapping visibly.
    Smoothed,
}

/// Persisted per-world configuration.
///
/// On-disk field names match the external interface: `Timezone`,
/// `OpenMeteoAPI`, `Convergence`, `GameTime`. Empty strings are treated as
/// absent. Read-only to the engine at runtime, except `game_time`, which
/// the deactivation path writes back.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// IANA zone id. Absent: the host's local zone.
    #[serde(rename = "Timezone", default)]
    timezone: Option<String>,
    /// Weather data-source key. Absent: weather sampling disabled for this
    /// world.
    #[serde(rename = "OpenMeteoAPI", default)]
    open_meteo_api_key: Option<String>,
    /// Clock convergence strategy.
    #[serde(rename = "Convergence", default)]
    pub convergence: ConvergenceStrategy,
    /// Simulated clock value persisted at world deactivation, so a
    /// cold-started host resumes consistent.
    #[serde(rename = "GameTime", default)]
    pub game_time: Option<NaiveDateTime>,
}

impl SyncConfig {
    /// Builds a config with empty strings normalized to absent.
    pub fn new(timezone: Option<String>, open_meteo_api_key: Option<String>) -> Self {
        Self {
            timezone: normalize(timezone),
            open_meteo_api_key: normalize(open_meteo_api_key),
            convergence: ConvergenceStrategy::default(),
            game_time: None,
        }
    }

    /// Configured IANA zone id, if any.
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn set_timezone(&mut self, timezone: Option<String>) {
        self.timezone = normalize(timezone);
    }

    /// Weather data-source key, if any.
    pub fn open_meteo_api_key(&self) -> Option<&str> {
        self.open_meteo_api_key.as_deref()
    }

    pub fn set_open_meteo_api_key(&mut self, key: Option<String>) {
        self.open_meteo_api_key = normalize(key);
    }

    /// Whether weather sampling is enabled for this world.
    pub fn weather_enabled(&self) -> bool {
        self.open_meteo_api_key.is_some()
    }

    /// Validates the timezone setting.
    ///
    /// An unresolvable zone is a warning, never an abort: callers fall back
    /// to the local zone at runtime.
    pub fn validate(&self) -> SyncResult<()> {
        if let Some(name) = self.timezone() {
            name.parse::<Tz>()
                .map_err(|_| SyncError::InvalidZone(name.to_string()))?;
        }
        Ok(())
    }

    /// Re-applies empty-string normalization after deserialization.
    fn normalized(mut self) -> Self {
        self.timezone = normalize(self.timezone.take());
        self.open_meteo_api_key = normalize(self.open_meteo_api_key.take());
        self
    }

    /// Loads the config from the default location, or returns defaults.
    ///
    /// Save location is platform-specific:
    /// - macOS: ~/Library/Application Support/realtime-sync/
    /// - Linux: ~/.local/share/realtime-sync/
    /// - Windows: %APPDATA%/realtime-sync/
    pub fn load_from_file() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("Could not determine config directory, using default sync config");
            return Self::default();
        };

        if !path.exists() {
            info!("No existing sync config found, using defaults");
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<SyncConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded sync config from {:?}", path);
                    config.normalized()
                }
                Err(e) => {
                    error!("Failed to parse sync config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read sync config: {}", e);
                Self::default()
            }
        }
    }

    /// Returns the platform-specific path of the config file.
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::data_dir().map(|mut path| {
            path.push("realtime-sync");
            path.push(CONFIG_FILE_NAME);
            path
        })
    }

    /// Saves the config to the default location, creating the directory if
    /// needed.
    pub fn save_to_file(&self) -> SyncResult<()> {
        let Some(path) = Self::config_path() else {
            return Err(SyncError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no platform data directory",
            )));
        };

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!("Saved sync config to {:?}", path);
        Ok(())
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_are_absent() {
        let config = SyncConfig::new(Some(String::new()), Some(String::new()));
        assert!(config.timezone().is_none());
        assert!(config.open_meteo_api_key().is_none());
        assert!(!config.weather_enabled());
    }

    #[test]
    fn test_setters_normalize() {
        let mut config = SyncConfig::default();
        config.set_timezone(Some(String::new()));
        assert!(config.timezone().is_none());
        config.set_open_meteo_api_key(Some("key".to_string()));
        assert!(config.weather_enabled());
    }

    #[test]
    fn test_validate_accepts_known_zone() {
        let config = SyncConfig::new(Some("Europe/Berlin".to_string()), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_absent_zone() {
        assert!(SyncConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_zone() {
        let config = SyncConfig::new(Some("Not/A_Zone".to_string()), None);
        match config.validate() {
            Err(SyncError::InvalidZone(name)) => assert_eq!(name, "Not/A_Zone"),
            other => panic!("Expected InvalidZone, got {:?}", other),
        }
    }

    #[test]
    fn test_external_field_names() {
        let mut config = SyncConfig::new(
            Some("America/New_York".to_string()),
            Some("key-123".to_string()),
        );
        config.convergence = ConvergenceStrategy::Smoothed;
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"Timezone\""));
        assert!(json.contains("\"OpenMeteoAPI\""));
        assert!(json.contains("\"Convergence\""));
        assert!(json.contains("\"Smoothed\""));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SyncConfig::new(Some("Asia/Tokyo".to_string()), Some("k".to_string()));
        config.convergence = ConvergenceStrategy::Smoothed;
        let json = serde_json::to_string(&config).unwrap();
        let back: SyncConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timezone(), Some("Asia/Tokyo"));
        assert_eq!(back.open_meteo_api_key(), Some("k"));
        assert_eq!(back.convergence, ConvergenceStrategy::Smoothed);
    }

    #[test]
    fn test_missing_fields_default() {
        let config: SyncConfig = serde_json::from_str("{}").unwrap();
        assert!(config.timezone().is_none());
        assert!(!config.weather_enabled());
        assert_eq!(config.convergence, ConvergenceStrategy::Direct);
        assert!(config.game_time.is_none());
    }

    #[test]
    fn test_loaded_empty_strings_normalize() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"Timezone": "", "OpenMeteoAPI": ""}"#).unwrap();
        let config = config.normalized();
        assert!(config.timezone().is_none());
        assert!(!config.weather_enabled());
    }
}
