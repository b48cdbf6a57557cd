//! Server configuration.

use std::env;
use std::time::Duration;

/// `DATABASE_URL` value that selects the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite URL, or `memory`.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Chat completion API key. Enhancement falls back offline without it.
    pub openai_api_key: Option<String>,
    /// Chat completion API base URL.
    pub openai_base_url: String,
    /// Chat completion model.
    pub openai_model: String,
    /// Timeout for one chat completion call, in seconds.
    pub openai_timeout_secs: u64,
    /// Timeout for a whole HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// Log level.
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("openai_configured", &self.openai_api_key.is_some())
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("TASKTIME_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("TASKTIME_JWT_SECRET is required"))?;

        Ok(Self {
            host: env::var("TASKTIME_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("TASKTIME_SERVER_PORT", 3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:tasktime.db?mode=rwc".to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_or(
                "TASKTIME_JWT_EXPIRATION_HOURS",
                auth::DEFAULT_JWT_EXPIRATION_HOURS,
            ),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_base_url: env::var("TASKTIME_OPENAI_BASE_URL")
                .unwrap_or_else(|_| enhancer::DEFAULT_BASE_URL.to_string()),
            openai_model: env::var("TASKTIME_OPENAI_MODEL")
                .unwrap_or_else(|_| enhancer::DEFAULT_MODEL.to_string()),
            openai_timeout_secs: parse_or("TASKTIME_OPENAI_TIMEOUT_SECS", 20),
            request_timeout_secs: parse_or("TASKTIME_REQUEST_TIMEOUT_SECS", 30),
            log_level: env::var("TASKTIME_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration for tests and local tooling: in-memory store, no AI key.
    pub fn for_testing(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: MEMORY_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: auth::DEFAULT_JWT_EXPIRATION_HOURS,
            openai_api_key: None,
            openai_base_url: enhancer::DEFAULT_BASE_URL.to_string(),
            openai_model: enhancer::DEFAULT_MODEL.to_string(),
            openai_timeout_secs: 20,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if the in-memory store is selected.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn enhancer_config(&self) -> enhancer::EnhancerConfig {
        enhancer::EnhancerConfig::default()
            .with_api_key(self.openai_api_key.clone())
            .with_base_url(&self.openai_base_url)
            .with_model(&self.openai_model)
            .with_timeout(Duration::from_secs(self.openai_timeout_secs))
    }
}
