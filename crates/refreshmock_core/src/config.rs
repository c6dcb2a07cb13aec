//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve bind address, data directory, store backend, logging and the
//!   query read-failure policy from `REFRESHMOCK_*` variables.
//! - Open the configured record store.
//!
//! # Invariants
//! - Every setting has a default; an unset environment yields a working
//!   CSV-backed, fail-soft configuration in the current directory.

use crate::logging::default_log_level;
use crate::repo::csv_store::CsvRecordStore;
use crate::repo::record_store::{SharedStore, StoreResult};
use crate::repo::sqlite_store::SqliteRecordStore;
use crate::service::query_service::ReadFailurePolicy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const ENV_HTTP_BIND: &str = "REFRESHMOCK_HTTP_BIND";
pub const ENV_DATA_DIR: &str = "REFRESHMOCK_DATA_DIR";
pub const ENV_STORE: &str = "REFRESHMOCK_STORE";
pub const ENV_LOG_LEVEL: &str = "REFRESHMOCK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "REFRESHMOCK_LOG_DIR";
pub const ENV_FAIL_SOFT: &str = "REFRESHMOCK_FAIL_SOFT";

const DEFAULT_HTTP_BIND: &str = "0.0.0.0:8000";
const DEFAULT_DATA_DIR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBind(String),
    UnknownStore(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBind(value) => write!(f, "invalid {ENV_HTTP_BIND} value `{value}`"),
            Self::UnknownStore(value) => {
                write!(f, "unknown store backend `{value}`; expected csv|sqlite")
            }
        }
    }
}

impl Error for ConfigError {}

/// Persistent store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Csv,
    Sqlite,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(ConfigError::UnknownStore(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub store: StoreBackend,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub read_failure_policy: ReadFailurePolicy,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = non_empty(lookup(ENV_HTTP_BIND)).unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind(bind.clone()))?;

        let store = match non_empty(lookup(ENV_STORE)) {
            Some(value) => StoreBackend::parse(&value)?,
            None => StoreBackend::default(),
        };

        Ok(Self {
            bind_addr,
            data_dir: PathBuf::from(
                non_empty(lookup(ENV_DATA_DIR)).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            store,
            log_level: non_empty(lookup(ENV_LOG_LEVEL))
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_empty(lookup(ENV_LOG_DIR)).map(PathBuf::from),
            read_failure_policy: parse_read_failure_policy(lookup(ENV_FAIL_SOFT).as_deref()),
        })
    }

    /// Opens the configured store rooted at `data_dir`.
    pub fn open_store(&self) -> StoreResult<SharedStore> {
        open_store(self.store, &self.data_dir)
    }
}

/// Opens a store of the given backend rooted at `data_dir`.
pub fn open_store(backend: StoreBackend, data_dir: &std::path::Path) -> StoreResult<SharedStore> {
    Ok(match backend {
        StoreBackend::Csv => Box::new(CsvRecordStore::new(data_dir)),
        StoreBackend::Sqlite => Box::new(SqliteRecordStore::open_in_dir(data_dir)?),
    })
}

fn parse_read_failure_policy(value: Option<&str>) -> ReadFailurePolicy {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "0" | "false" | "off" | "no") => {
            ReadFailurePolicy::Propagate
        }
        _ => ReadFailurePolicy::FailSoft,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, StoreBackend, ENV_FAIL_SOFT, ENV_HTTP_BIND, ENV_STORE};
    use crate::service::query_service::ReadFailurePolicy;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.store, StoreBackend::Csv);
        assert_eq!(config.log_dir, None);
        assert_eq!(config.read_failure_policy, ReadFailurePolicy::FailSoft);
    }

    #[test]
    fn fail_soft_can_be_disabled() {
        for value in ["0", "false", "OFF", " no "] {
            let config = config_with(&[(ENV_FAIL_SOFT, value)]).unwrap();
            assert_eq!(config.read_failure_policy, ReadFailurePolicy::Propagate);
        }
        let config = config_with(&[(ENV_FAIL_SOFT, "yes")]).unwrap();
        assert_eq!(config.read_failure_policy, ReadFailurePolicy::FailSoft);
    }

    #[test]
    fn rejects_invalid_bind_and_unknown_store() {
        assert!(matches!(
            config_with(&[(ENV_HTTP_BIND, "localhost")]),
            Err(ConfigError::InvalidBind(_))
        ));
        assert!(matches!(
            config_with(&[(ENV_STORE, "postgres")]),
            Err(ConfigError::UnknownStore(_))
        ));
        assert_eq!(
            config_with(&[(ENV_STORE, "SQLite")]).unwrap().store,
            StoreBackend::Sqlite
        );
    }
}
