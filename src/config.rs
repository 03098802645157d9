//! Application configuration management.
//!
//! Settings come from an optional JSON file at the platform config directory
//! (`~/.config/mealboard/config.json` on Linux), then environment variables
//! (a `.env` file is honored by the binary) override individual fields.

use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orchestrator::Policy;

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "mealboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Rating store file name inside the data directory
const STORE_FILE: &str = "ratings.json";

/// Log file name prefix inside the cache directory
const LOG_FILE: &str = "mealboard.log";

/// Default NEIS open API hub
pub const DEFAULT_BASE_URL: &str = "https://open.neis.go.kr/hub";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("Could not determine a home directory for application data")]
    NoHomeDirectory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// NEIS API key
    pub api_key: Option<String>,
    /// NEIS open API hub URL
    pub base_url: String,
    /// Office of education code (서울특별시교육청 = H10)
    pub office_code: String,
    /// School code within the office
    pub school_code: String,
    /// Maximum age of a loaded day before it is fetched again
    pub freshness_hours: u32,
    /// Lifetime of a month snapshot in the cache
    pub cache_ttl_hours: u32,
    /// Rating store file; defaults to the platform data directory
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            office_code: "H10".to_string(),
            school_code: "7480075".to_string(),
            freshness_hours: 24,
            cache_ttl_hours: 24,
            store_path: None,
        }
    }
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match project_dirs() {
            Some(dirs) => Self::load_from(&dirs.config_dir().join(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Loads a config file, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from a variable lookup such as `std::env::var`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("NEIS_API_KEY").filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(code) = lookup("MEALBOARD_OFFICE_CODE") {
            self.office_code = code;
        }
        if let Some(code) = lookup("MEALBOARD_SCHOOL_CODE") {
            self.school_code = code;
        }
        if let Some(url) = lookup("MEALBOARD_BASE_URL") {
            self.base_url = url;
        }
        if let Some(hours) = lookup("MEALBOARD_FRESHNESS_HOURS") {
            self.freshness_hours = parse_hours("MEALBOARD_FRESHNESS_HOURS", &hours)?;
        }
        if let Some(hours) = lookup("MEALBOARD_CACHE_TTL_HOURS") {
            self.cache_ttl_hours = parse_hours("MEALBOARD_CACHE_TTL_HOURS", &hours)?;
        }
        Ok(())
    }

    /// Cache and freshness policy for the orchestrator
    pub fn policy(&self) -> Policy {
        Policy {
            freshness: Duration::hours(i64::from(self.freshness_hours)),
            cache_ttl: Duration::hours(i64::from(self.cache_ttl_hours)),
        }
    }

    /// Path of the rating store file
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.store_path {
            return Ok(path.clone());
        }
        let dirs = project_dirs().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(dirs.data_dir().join(STORE_FILE))
    }

    /// Directory and file name for the TUI log
    pub fn log_location() -> Result<(PathBuf, &'static str), ConfigError> {
        let dirs = project_dirs().ok_or(ConfigError::NoHomeDirectory)?;
        Ok((dirs.cache_dir().to_path_buf(), LOG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

fn parse_hours(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|hours| *hours > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.office_code, "H10");
        assert_eq!(config.school_code, "7480075");
        assert_eq!(config.freshness_hours, 24);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"school_code": "1234567", "freshness_hours": 6}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.school_code, "1234567");
        assert_eq!(config.freshness_hours, 6);
        assert_eq!(config.office_code, "H10");
    }

    #[test]
    fn test_load_from_invalid_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("NEIS_API_KEY", "abc"),
                ("MEALBOARD_SCHOOL_CODE", "7654321"),
                ("MEALBOARD_FRESHNESS_HOURS", "12"),
            ]))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.school_code, "7654321");
        assert_eq!(config.freshness_hours, 12);
        assert_eq!(config.cache_ttl_hours, 24);
    }

    #[test]
    fn test_empty_api_key_is_ignored() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[("NEIS_API_KEY", "")]))
            .unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_hours_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup_from(&[("MEALBOARD_FRESHNESS_HOURS", "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = config.apply_overrides(lookup_from(&[("MEALBOARD_CACHE_TTL_HOURS", "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_policy_uses_hours() {
        let config = Config {
            freshness_hours: 6,
            cache_ttl_hours: 48,
            ..Config::default()
        };
        let policy = config.policy();
        assert_eq!(policy.freshness, Duration::hours(6));
        assert_eq!(policy.cache_ttl, Duration::hours(48));
    }

    #[test]
    fn test_explicit_store_path_wins() {
        let config = Config {
            store_path: Some(PathBuf::from("/tmp/ratings.json")),
            ..Config::default()
        };
        assert_eq!(config.store_path().unwrap(), PathBuf::from("/tmp/ratings.json"));
    }
}
