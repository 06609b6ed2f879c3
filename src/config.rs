use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama2";
const DEFAULT_SUMMARY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SUMMARY_RETRY_BACKOFF_MS: u64 = 250;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Rusty Students server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds on `0.0.0.0`.
    pub server_port: u16,
    /// Base URL of the Ollama runtime used for summaries.
    pub ollama_url: String,
    /// Chat model requested from Ollama.
    pub ollama_model: String,
    /// Deadline applied to each outbound summary attempt.
    pub summary_timeout: Duration,
    /// Additional attempts made after a transport failure (`0` disables retries).
    pub summary_max_retries: u32,
    /// Base delay between retries; attempt `n` waits `n * backoff`.
    pub summary_retry_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            summary_timeout: Duration::from_secs(DEFAULT_SUMMARY_TIMEOUT_SECS),
            summary_max_retries: 0,
            summary_retry_backoff: Duration::from_millis(DEFAULT_SUMMARY_RETRY_BACKOFF_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let summary_timeout_secs: u64 =
            parse_optional(optional("SUMMARY_TIMEOUT_SECS"), "SUMMARY_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_SUMMARY_TIMEOUT_SECS);
        if summary_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("SUMMARY_TIMEOUT_SECS".into()));
        }

        Ok(Self {
            server_port: parse_optional(optional("SERVER_PORT"), "SERVER_PORT")?
                .unwrap_or(defaults.server_port),
            ollama_url: optional("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: optional("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            summary_timeout: Duration::from_secs(summary_timeout_secs),
            summary_max_retries: parse_optional(
                optional("SUMMARY_MAX_RETRIES"),
                "SUMMARY_MAX_RETRIES",
            )?
            .unwrap_or(defaults.summary_max_retries),
            summary_retry_backoff: parse_optional(
                optional("SUMMARY_RETRY_BACKOFF_MS"),
                "SUMMARY_RETRY_BACKOFF_MS",
            )?
            .map(Duration::from_millis)
            .unwrap_or(defaults.summary_retry_backoff),
        })
    }
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// `port_override` (typically from the command line) wins over `SERVER_PORT`.
pub fn init_config(port_override: Option<u16>) -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let mut config = Config::from_env()?;
    if let Some(port) = port_override {
        config.server_port = port;
    }
    tracing::debug!(
        server_port = config.server_port,
        ollama_url = %config.ollama_url,
        ollama_model = %config.ollama_model,
        summary_timeout = ?config.summary_timeout,
        summary_max_retries = config.summary_max_retries,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
