// crates/semspect-init-config/src/config.rs
// ============================================================================
// Module: Semspect Init Configuration
// Description: TOML configuration model with fail-closed validation.
// Purpose: Supply connection settings and the ordered target list.
// Dependencies: semspect-init-core, serde, toml
// ============================================================================

//! ## Overview
//! The configuration file names the connection endpoint, the connector's own
//! credentials, and the ordered list of initialization targets. Loading is
//! fail-closed: size and path limits, UTF-8, strict TOML parsing (unknown
//! privilege tiers are a parse error, never a silent default), then
//! cross-field validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use semspect_init_core::InitTarget;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "semspect-init.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SEMSPECT_INIT_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of targets in one batch.
pub(crate) const MAX_TARGETS: usize = 1024;
/// Minimum allowed request timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum allowed request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Default request timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Maximum allowed response size in bytes.
pub(crate) const MAX_RESPONSE_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Default maximum response size in bytes.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Semspect Init configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfig {
    /// Connection settings for the graph database endpoint.
    pub connection: ConnectionConfig,
    /// Ordered initialization targets.
    #[serde(default)]
    pub targets: Vec<InitTarget>,
}

/// Connection settings for the graph database endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Base URL of the graph database HTTP endpoint.
    pub uri: String,
    /// Username the connector authenticates as.
    pub username: String,
    /// Password in the configuration file (mutually exclusive with
    /// `password_env`).
    #[serde(default)]
    pub password: Option<String>,
    /// Environment variable holding the password (mutually exclusive with
    /// `password`).
    #[serde(default)]
    pub password_env: Option<String>,
    /// Allow cleartext HTTP (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Returns the default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file failed to parse.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config content failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl InitConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, the `SEMSPECT_INIT_CONFIG`
    /// environment variable, then `./semspect-init.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.connection.validate()?;
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid("at least one target is required".to_string()));
        }
        if self.targets.len() > MAX_TARGETS {
            return Err(ConfigError::Invalid(format!(
                "too many targets ({} > {MAX_TARGETS})",
                self.targets.len()
            )));
        }
        for target in &self.targets {
            if target.user.is_empty() {
                return Err(ConfigError::Invalid("target user must not be empty".to_string()));
            }
            if target.database.is_empty() {
                return Err(ConfigError::Invalid(
                    "target database must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl ConnectionConfig {
    /// Validates the connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            return Err(ConfigError::Invalid("connection uri must not be empty".to_string()));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Invalid(
                "connection username must not be empty".to_string(),
            ));
        }
        match (&self.password, &self.password_env) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "password and password_env are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "one of password or password_env is required".to_string(),
                ));
            }
            _ => {}
        }
        if let Some(name) = &self.password_env
            && name.is_empty()
        {
            return Err(ConfigError::Invalid("password_env must not be empty".to_string()));
        }
        if self.timeout_ms < MIN_TIMEOUT_MS || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "timeout_ms must be within {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_response_bytes must be within 1..={MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Resolves the connector password, reading the environment when
    /// `password_env` is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the environment variable is missing or
    /// not valid unicode.
    pub fn resolve_password(&self) -> Result<String, ConfigError> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        let Some(name) = &self.password_env else {
            return Err(ConfigError::Invalid(
                "one of password or password_env is required".to_string(),
            ));
        };
        env::var(name).map_err(|_| {
            ConfigError::Invalid(format!("password environment variable {name} is not set"))
        })
    }
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves the configuration path from the argument, environment, or
/// default location.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(from_env) = env::var(CONFIG_ENV_VAR) {
        if from_env.is_empty() {
            return Err(ConfigError::Invalid(format!("{CONFIG_ENV_VAR} must not be empty")));
        }
        return Ok(PathBuf::from(from_env));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates path shape limits before any filesystem access.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let total_length = path.as_os_str().len();
    if total_length > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if let Component::Normal(part) = component
            && part.len() > MAX_PATH_COMPONENT_LENGTH
        {
            return Err(ConfigError::Invalid(
                "config path component exceeds length limit".to_string(),
            ));
        }
    }
    Ok(())
}
