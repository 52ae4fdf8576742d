//! Application configuration
//!
//! Read from `$UNITKO_CONFIG` when set, otherwise `unitko.toml` in the
//! platform config directory. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const CONFIG_ENV: &str = "UNITKO_CONFIG";
const CONFIG_FILE: &str = "unitko.toml";
const DATABASE_FILE: &str = "unitko.db";

/// Longest session lifetime accepted from configuration (one year)
pub const MAX_SESSION_HOURS: i64 = 24 * 366;
/// Longest background refresh period accepted from configuration (one day)
pub const MAX_REFRESH_WINDOW_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the platform data directory location
    pub database_path: Option<PathBuf>,
    /// Lifetime of an issued landlord session
    pub session_hours: i64,
    /// How often a live session is refreshed in the background
    pub refresh_window_minutes: i64,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            session_hours: 168,
            refresh_window_minutes: 60,
            log_filter: "info".to_string(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("app", "unitko", "unitko").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        ))
    })
}

impl AppConfig {
    /// Load from the environment override or the platform location
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => project_dirs()?.config_dir().join(CONFIG_FILE),
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_hours <= 0 || self.session_hours > MAX_SESSION_HOURS {
            return Err(Error::Config(format!(
                "session_hours must be between 1 and {}",
                MAX_SESSION_HOURS
            )));
        }
        if self.refresh_window_minutes <= 0
            || self.refresh_window_minutes > MAX_REFRESH_WINDOW_MINUTES
        {
            return Err(Error::Config(format!(
                "refresh_window_minutes must be between 1 and {}",
                MAX_REFRESH_WINDOW_MINUTES
            )));
        }
        Ok(())
    }

    /// Database location, creating its parent directory
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => project_dirs()?.data_dir().join(DATABASE_FILE),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.session_hours, 168);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unitko.toml");
        fs::write(&path, "session_hours = 12\nlog_filter = \"debug\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.session_hours, 12);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.refresh_window_minutes, 60);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unitko.toml");
        fs::write(&path, "session_hours = \"forever\"").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(Error::Config(_))));

        fs::write(&path, "session_hours = 0").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_out_of_range_durations_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unitko.toml");

        for content in [
            "session_hours = 1000000000000000",
            "session_hours = 8785",
            "refresh_window_minutes = 9223372036854775807",
            "refresh_window_minutes = -5",
        ] {
            fs::write(&path, content).unwrap();
            assert!(
                matches!(AppConfig::load_from(&path), Err(Error::Config(_))),
                "accepted {}",
                content
            );
        }

        fs::write(
            &path,
            format!(
                "session_hours = {}\nrefresh_window_minutes = {}",
                MAX_SESSION_HOURS, MAX_REFRESH_WINDOW_MINUTES
            ),
        )
        .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.session_hours, MAX_SESSION_HOURS);
    }

    #[test]
    fn test_database_path_override_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: Some(dir.path().join("nested").join("unitko.db")),
            ..AppConfig::default()
        };
        let path = config.database_path().unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}
