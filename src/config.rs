use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Optional GitHub API token (GITHUB_TOKEN, falling back to GITHUB_PAT)
    pub github_token: Option<String>,
    /// Outbound HTTP request timeout in seconds (default: 20)
    pub http_timeout_secs: u64,
    /// Politeness delay between per-language page fetches in ms (default: 500)
    pub fetch_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let github_token = env::var("GITHUB_TOKEN")
            .or_else(|_| env::var("GITHUB_PAT"))
            .ok()
            .filter(|t| !t.is_empty());

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS"))?;

        let fetch_delay_ms = env::var("FETCH_DELAY_MS")
            .unwrap_or_else(|_| "500".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("FETCH_DELAY_MS"))?;

        Ok(Self {
            host,
            port,
            github_token,
            http_timeout_secs,
            fetch_delay_ms,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
