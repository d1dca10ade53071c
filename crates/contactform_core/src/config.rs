//! Environment-driven configuration for the store connector and logging.
//!
//! # Responsibility
//! - Resolve database location, busy timeout and log settings.
//! - Load an optional `.env` file before reading process variables.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Resolution never panics; malformed values return `ConfigError`.

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "CONTACTFORM_DB_PATH";
pub const ENV_DB_BUSY_TIMEOUT_MS: &str = "CONTACTFORM_DB_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "CONTACTFORM_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CONTACTFORM_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "contactform.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
    NotAbsolute {
        key: &'static str,
        value: String,
    },
    /// A `.env` file exists but could not be read or parsed.
    EnvFile(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid value `{value}` for {key}: {message}"),
            Self::NotAbsolute { key, value } => {
                write!(f, "{key} must be an absolute path, got `{value}`")
            }
            Self::EnvFile(message) => write!(f, "cannot load .env file: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved settings for opening the contact store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory. File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Loads `.env` (if present) and resolves settings from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        env_file_outcome(dotenv::dotenv().map(|_| ()))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads variables from one `.env`-style file into the process
    /// environment. Returns `false` when the file does not exist.
    pub fn load_env_file(path: &Path) -> Result<bool, ConfigError> {
        env_file_outcome(dotenv::from_path(path))
    }

    /// Resolves settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = read(ENV_DB_BUSY_TIMEOUT_MS) {
            let millis = raw.parse::<u64>().map_err(|err| ConfigError::InvalidValue {
                key: ENV_DB_BUSY_TIMEOUT_MS,
                value: raw.clone(),
                message: err.to_string(),
            })?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        if let Some(dir) = read(ENV_LOG_DIR) {
            let path = PathBuf::from(&dir);
            if !path.is_absolute() {
                return Err(ConfigError::NotAbsolute {
                    key: ENV_LOG_DIR,
                    value: dir,
                });
            }
            config.log_dir = Some(path);
        }

        Ok(config)
    }
}

// Missing file is the normal case outside local development.
fn env_file_outcome(result: dotenv::Result<()>) -> Result<bool, ConfigError> {
    match result {
        Ok(()) => Ok(true),
        Err(dotenv::Error::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(ConfigError::EnvFile(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, ENV_DB_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert!(config.db_path.ends_with("contactform.sqlite3"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let log_dir = std::env::temp_dir().join("contactform-logs");
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /var/lib/contacts.db "),
            (ENV_DB_BUSY_TIMEOUT_MS, "250"),
            ("CONTACTFORM_LOG_LEVEL", "warn"),
            (ENV_LOG_DIR, log_dir.to_str().unwrap()),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/contacts.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(log_dir));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = StoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "   ")])).unwrap();
        assert_eq!(config.db_path, StoreConfig::default().db_path);
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_DB_BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_DB_BUSY_TIMEOUT_MS,
                ..
            }
        ));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err =
            StoreConfig::from_lookup(lookup_from(&[(ENV_LOG_DIR, "logs/dev")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotAbsolute {
                key: ENV_LOG_DIR,
                value: "logs/dev".to_string(),
            }
        );
    }

    #[test]
    fn missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = StoreConfig::load_env_file(&dir.path().join(".env")).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "CONTACTFORM_BROKEN='unterminated\n").unwrap();

        let err = StoreConfig::load_env_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
        assert!(std::env::var("CONTACTFORM_BROKEN").is_err());
    }

    #[test]
    fn valid_env_file_populates_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "CONTACTFORM_ENV_FILE_MARKER=loaded\n").unwrap();

        assert!(StoreConfig::load_env_file(&path).unwrap());
        assert_eq!(
            std::env::var("CONTACTFORM_ENV_FILE_MARKER").as_deref(),
            Ok("loaded")
        );
    }
}
