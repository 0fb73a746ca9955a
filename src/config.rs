use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::ConfigError;

#[derive(Parser, Debug, Clone)]
#[command(name = "http-barrage")]
#[command(about = "Fires a fixed number of HTTP GET requests and reports latency", long_about = None)]
pub struct Config {
    /// Target URL
    #[arg(long, env = "BARRAGE_URL", default_value = "")]
    pub url: String,

    /// Total number of requests to send
    #[arg(long, env = "BARRAGE_REQUESTS", default_value = "10")]
    pub requests: usize,

    /// Number of concurrent workers
    #[arg(long, env = "BARRAGE_CONCURRENCY", default_value = "1")]
    pub concurrency: usize,

    /// Per-request timeout in milliseconds (none by default)
    #[arg(long, env = "BARRAGE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Checks the settings and returns the parsed target URL.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(url)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
