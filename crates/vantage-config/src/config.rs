//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Default config directory: `<platform config dir>/vantage`, or `./vantage`
/// if the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vantage")
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World view window.
    pub view: ViewConfig,
    /// Speculative action handling.
    pub prediction: PredictionConfig,
    /// Server connection.
    pub network: NetworkConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World view configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// View distance in columns. The cache keeps a margin beyond this and
    /// never goes below radius 2.
    pub view_distance: u32,
}

/// Prediction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictionConfig {
    /// Maximum unacknowledged actions kept for reconciliation.
    pub ledger_capacity: usize,
    /// Ticks between consecutive completed breaks.
    pub fast_path_cooldown_ticks: u32,
    /// Ticks between hit sounds while breaking.
    pub hit_sound_interval: u32,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Server address.
    pub server_address: String,
    /// Server port.
    pub server_port: u16,
    /// Simulation ticks per second.
    pub tick_rate: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for ViewConfig {
    fn default() -> Self {
        Self { view_distance: 8 }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            ledger_capacity: 50,
            fast_path_cooldown_ticks: 5,
            hit_sound_interval: 4,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1".to_string(),
            server_port: 25565,
            tick_rate: 20,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Loads `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            return Ok(config);
        }

        let config = Self::read(&config_path)?;
        log::info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Saves to `config_dir/config.ron`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        let path = config_dir.join(CONFIG_FILE);
        std::fs::write(&path, text).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-reads the file. Returns `Some(new_config)` only if it differs from
    /// `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_tuning() {
        let config = Config::default();
        assert_eq!(config.prediction.ledger_capacity, 50);
        assert_eq!(config.prediction.fast_path_cooldown_ticks, 5);
        assert_eq!(config.prediction.hit_sound_interval, 4);
        assert_eq!(config.network.tick_rate, 20);
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("view_distance: 8"));
        assert!(ron_str.contains("ledger_capacity: 50"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(view: (view_distance: 12))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.view.view_distance, 12);
        assert_eq!(config.prediction, PredictionConfig::default());
        assert_eq!(config.debug, DebugConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(render_scale: 2.0)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.view.view_distance = 4;
        config.prediction.ledger_capacity = 10;
        config.network.server_address = "10.0.0.1".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(view: 12").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Some(dir.path().join(CONFIG_FILE).as_path()));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_reload_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), Some(dir.path().join(CONFIG_FILE).as_path()));
    }

    #[test]
    fn test_save_into_file_reports_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let err = Config::default().save(&blocker).unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }));
        assert_eq!(err.path(), Some(blocker.as_path()));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.network.tick_rate = 40;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.network.tick_rate), Some(40));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_default_dir_is_named() {
        assert!(default_config_dir().ends_with("vantage"));
    }
}
