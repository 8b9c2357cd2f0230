//! Runtime configuration resolved from environment variables.
//!
//! # Invariants
//! - Every field has a usable default; an empty variable counts as unset.
//! - Invalid values are rejected with the offending variable name.

use crate::logging::{default_log_level, is_supported_level};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "PMS_DB_PATH";
pub const ENV_LOG_DIR: &str = "PMS_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "PMS_LOG_LEVEL";
pub const ENV_SESSION_CHECK_SECS: &str = "PMS_SESSION_CHECK_SECS";
pub const ENV_SESSION_TTL_SECS: &str = "PMS_SESSION_TTL_SECS";
pub const ENV_LOGIN_DELAY_MS: &str = "PMS_LOGIN_DELAY_MS";

const DEFAULT_DB_FILE_NAME: &str = "pms_core.sqlite3";
/// Session liveness is re-validated every five minutes.
pub const DEFAULT_SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { variable: &'static str, value: String },
    ZeroNotAllowed(&'static str),
    UnsupportedLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a non-negative integer, got `{value}`")
            }
            Self::ZeroNotAllowed(variable) => write!(f, "{variable} must be greater than zero"),
            Self::UnsupportedLogLevel(value) => write!(
                f,
                "{ENV_LOG_LEVEL} `{value}` is unsupported; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Explicit log directory. `None` means `<db dir>/logs`.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub session_check_interval: Duration,
    pub session_ttl: Duration,
    /// Simulated latency applied before credential checks.
    pub login_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_dir: None,
            log_level: default_log_level().to_string(),
            session_check_interval: DEFAULT_SESSION_CHECK_INTERVAL,
            session_ttl: DEFAULT_SESSION_TTL,
            login_delay: Duration::ZERO,
        }
    }
}

impl AppConfig {
    /// Resolves configuration from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an explicit key/value map.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            if !is_supported_level(&level) {
                return Err(ConfigError::UnsupportedLogLevel(level));
            }
            config.log_level = level.to_ascii_lowercase();
        }
        if let Some(raw) = read(ENV_SESSION_CHECK_SECS) {
            let secs = parse_u64(ENV_SESSION_CHECK_SECS, &raw)?;
            if secs == 0 {
                return Err(ConfigError::ZeroNotAllowed(ENV_SESSION_CHECK_SECS));
            }
            config.session_check_interval = Duration::from_secs(secs);
        }
        if let Some(raw) = read(ENV_SESSION_TTL_SECS) {
            let secs = parse_u64(ENV_SESSION_TTL_SECS, &raw)?;
            if secs == 0 {
                return Err(ConfigError::ZeroNotAllowed(ENV_SESSION_TTL_SECS));
            }
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(raw) = read(ENV_LOGIN_DELAY_MS) {
            config.login_delay = Duration::from_millis(parse_u64(ENV_LOGIN_DELAY_MS, &raw)?);
        }

        Ok(config)
    }

    /// Returns the effective log directory.
    pub fn resolved_log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => self
                .db_path
                .parent()
                .map(|parent| parent.join("logs"))
                .unwrap_or_else(|| std::env::temp_dir().join("pms-logs")),
        }
    }
}

fn parse_u64(variable: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        variable,
        value: raw.to_string(),
    })
}
