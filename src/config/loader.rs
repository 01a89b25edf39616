//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Names of the environment variables the loader consults.
pub mod env {
    pub const CONFIG_PATH: &str = "PROXY_CONFIG";
    pub const DOTENV_PATH: &str = "DOTENV_PATH";
    pub const PORT: &str = "PORT";
    pub const UPSTREAM_URL: &str = "UPSTREAM_URL";
    pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Dotenv { path: PathBuf, source: dotenvy::Error },
    Env { name: &'static str, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Dotenv { path, source } => {
                write!(f, "Failed to load env file {}: {}", path.display(), source)
            }
            ConfigError::Env { name, reason } => write!(f, "Invalid {}: {}", name, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Dotenv { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Populate the process environment from an optional `.env` file.
///
/// Returns `Ok(None)` when the file does not exist. Variables already set in
/// the environment win over the file.
pub fn load_dotenv(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(None),
        Err(source) => Err(ConfigError::Dotenv {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Layer environment variables over `config`. Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: ProxyConfig, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(port) = get(env::PORT) {
        config.listener.port = port.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
            name: env::PORT,
            reason: format!("'{}': {}", port, e),
        })?;
    }
    if let Some(url) = get(env::UPSTREAM_URL) {
        config.upstream.base_url = url;
    }
    if let Some(secs) = get(env::UPSTREAM_TIMEOUT_SECS) {
        config.upstream.timeout_secs = secs.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
            name: env::UPSTREAM_TIMEOUT_SECS,
            reason: format!("'{}': {}", secs, e),
        })?;
    }
    if let Some(level) = get(env::LOG_LEVEL) {
        config.observability.log_level = level;
    }

    Ok(config)
}

/// Resolve the final configuration once at startup.
///
/// Defaults, then the TOML file named by `PROXY_CONFIG` (if any), then
/// environment overrides, then validation.
pub fn resolve_config<F>(lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match lookup(env::CONFIG_PATH).filter(|p| !p.is_empty()) {
        Some(path) => load_config(Path::new(&path))?,
        None => ProxyConfig::default(),
    };

    let config = apply_env_overrides(base, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// [`resolve_config`] against the real process environment.
pub fn from_env() -> Result<ProxyConfig, ConfigError> {
    resolve_config(|name| std::env::var(name).ok())
}
