//! # configs
//!
//! Layered runtime settings: built-in defaults, then `config/default.toml`,
//! then `config/local.toml`, then `STOCKROOM__*` environment variables
//! (`__` separates nesting levels, e.g. `STOCKROOM__DATABASE__URL`).
//! A `.env` file is loaded first if present.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "STOCKROOM";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub llm: LlmSettings,
    pub logging: LoggingSettings,
    pub policy: PolicySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: Option<SecretString>,
    /// Expected `aud` claim; unchecked when absent.
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LlmSettings {
    /// Semantic search is disabled without a base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PolicySettings {
    pub enforce_comment_authorship: bool,
    pub enforce_po_transitions: bool,
}

impl Settings {
    /// Reads `.env`, the optional TOML files under `config/`, and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let config = defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true))
            .build()?;
        Self::from_config(config)
    }

    /// Deserializes and checks cross-field requirements.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("database.url"));
        }
        if self.auth.jwt_secret.is_none() {
            return Err(ConfigError::Missing("auth.jwt_secret"));
        }
        Ok(())
    }
}

/// Built-in defaults, the lowest-priority layer.
pub fn defaults<St: config::builder::BuilderState>(
    builder: config::builder::ConfigBuilder<St>,
) -> Result<config::builder::ConfigBuilder<St>, ConfigError> {
    Ok(builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.backend", "memory")?
        .set_default("database.max_connections", 10)?
        .set_default("llm.model", "gpt-4o-mini")?
        .set_default("llm.timeout_secs", 30)?
        .set_default("logging.format", "pretty")?
        .set_default("logging.filter", "info")?
        .set_default("policy.enforce_comment_authorship", true)?
        .set_default("policy.enforce_po_transitions", false)?)
}
