//! TOML-based configuration.
//!
//! Read from `$MAINTSCHED_CONFIG`, or `<config dir>/maintsched/config.toml`.
//! A missing file means defaults. `$MAINTSCHED_DATA_DIR` overrides `data_dir`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "MAINTSCHED_CONFIG";
pub const DATA_DIR_ENV: &str = "MAINTSCHED_DATA_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where saved schedules and machine history live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Default directory for exported files.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixes advisory template selection when set.
    #[serde(default)]
    pub advisory_seed: Option<u64>,
}

fn default_data_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("maintsched");
    p
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
            log_level: default_log_level(),
            advisory_seed: None,
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn path() -> PathBuf {
        std::env::var(CONFIG_ENV).map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("maintsched");
            p.push("config.toml");
            p
        })
    }

    /// Loads the configuration from [`Config::path`] and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::path())?;
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Loads `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&s).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
