use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use ytcreator_chain::{LlmSettings, SessionLimits, WikipediaConfig, DEFAULT_TEMPERATURE};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Alternative OpenAI-compatible endpoint; the public API when unset
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl Default for LlmConfig {
    fn default() -> Self {
        let settings = LlmSettings::default();
        Self {
            model: settings.model,
            temperature: settings.temperature,
            base_url: None,
        }
    }
}

impl From<&LlmConfig> for LlmSettings {
    fn from(config: &LlmConfig) -> Self {
        LlmSettings::new(config.model.clone()).with_temperature(config.temperature)
    }
}

/// In-memory session retention; `0` disables a bound
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    pub idle_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 3600,
            max_sessions: 10_000,
        }
    }
}

impl From<&SessionsConfig> for SessionLimits {
    fn from(config: &SessionsConfig) -> Self {
        let mut limits = SessionLimits::default();
        if config.idle_ttl_secs > 0 {
            limits = limits.with_idle_ttl(Duration::from_secs(config.idle_ttl_secs));
        }
        if config.max_sessions > 0 {
            limits = limits.with_max_sessions(config.max_sessions);
        }
        limits
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    pub path: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("../keys/openai-keys.yaml"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables `YTCREATOR_<SECTION>__<KEY>`, e.g. `YTCREATOR_SERVER__PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("YTCREATOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        config.try_deserialize()
    }
}
