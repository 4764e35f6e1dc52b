//! Configuration management for zonedir
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Default zone listing API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Largest page size accepted by the listing endpoint
pub const MAX_PER_PAGE: u32 = 50;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Zone listing API configuration
    pub api: ApiConfig,

    /// Liveness probe configuration
    pub probe: ProbeConfig,

    /// Refresh timer configuration
    pub refresh: RefreshConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Zone listing API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without trailing `/zones`
    pub base_url: String,

    /// Bearer token
    pub api_token: String,

    /// Zones per page (1-50)
    pub per_page: u32,

    /// Page request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Liveness probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Probe active zones; when false every zone counts as alive
    pub enabled: bool,

    /// Per-probe timeout in milliseconds
    pub timeout_ms: u64,
}

/// Refresh timer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between scheduled refreshes
    pub interval_secs: u64,

    /// Coalesce overlapping refreshes into one remote cycle
    pub single_flight: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub bind_address: SocketAddr,

    /// Allow any origin
    pub enable_cors: bool,

    /// Enable request tracing
    pub enable_request_logging: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: String::new(),
            per_page: MAX_PER_PAGE,
            request_timeout_secs: 30,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 5000,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 600, // 10 minutes
            single_flight: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.apply_env();
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    /// Override fields with any environment variables that are set
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("CF_KEY") {
            self.api.api_token = token;
        }

        if let Ok(base_url) = std::env::var("ZONEDIR_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Some(per_page) = env_parse::<u32>("ZONEDIR_PER_PAGE") {
            self.api.per_page = per_page;
        }

        if let Some(secs) = env_parse::<u64>("ZONEDIR_REQUEST_TIMEOUT") {
            self.api.request_timeout_secs = secs;
        }

        if let Ok(check) = std::env::var("CHECK_DOMAINS") {
            self.probe.enabled = check.trim().eq_ignore_ascii_case("true");
        }

        if let Some(timeout_ms) = env_parse::<u64>("TIMEOUT") {
            self.probe.timeout_ms = timeout_ms;
        }

        if let Some(secs) = env_parse::<u64>("ZONEDIR_REFRESH_INTERVAL") {
            self.refresh.interval_secs = secs;
        }

        if let Some(single_flight) = env_parse::<bool>("ZONEDIR_SINGLE_FLIGHT") {
            self.refresh.single_flight = single_flight;
        }

        if let Some(port) = env_parse::<u16>("PORT") {
            self.server.bind_address.set_port(port);
        }

        if let Ok(level) = std::env::var("ZONEDIR_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("ZONEDIR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.api_token.trim().is_empty() {
            anyhow::bail!("api_token must be set (CF_KEY)");
        }

        url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api base_url: {}", self.api.base_url))?;

        if !(1..=MAX_PER_PAGE).contains(&self.api.per_page) {
            anyhow::bail!("per_page must be between 1 and {MAX_PER_PAGE}");
        }

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.probe.timeout_ms == 0 {
            anyhow::bail!("probe timeout_ms must be greater than 0");
        }

        if self.refresh.interval_secs == 0 {
            anyhow::bail!("refresh interval_secs must be greater than 0");
        }

        Ok(())
    }

    /// Get page request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Get probe timeout as Duration
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe.timeout_ms)
    }

    /// Get refresh period as Duration
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
