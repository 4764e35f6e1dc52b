//! Liveness probing for zones
//!
//! A zone is probed with a HEAD request against `https://<zone>`. Any
//! response below 500 counts as alive (the zone answered, even if with a
//! client error). A 5xx response, a timeout or no response at all counts as
//! not alive. Probing can be disabled globally, in which case every zone is
//! reported alive without any network traffic.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::ProbeConfig;
use crate::metrics::{self, ProbeOutcome};
use crate::utils::error::{DirectoryError, ProbeError};

/// Default probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Determines whether a zone currently responds
///
/// Implementations never fail: every transport problem resolves to `false`.
#[async_trait]
pub trait LivenessProber: Send + Sync {
    async fn probe(&self, zone: &str) -> bool;
}

/// HEAD-request based prober
pub struct HttpProber {
    /// HTTP client with the probe timeout applied
    client: Client,

    /// When false, every zone is reported alive
    enabled: bool,

    timeout: Duration,

    /// Optional base URL override for testing with mock servers;
    /// probes go to `{base}/{zone}` instead of `https://{zone}`
    target_base: Option<String>,
}

impl HttpProber {
    /// Create an enabled prober with the given timeout
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::ClientBuild` if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self, DirectoryError> {
        Self::with_options(true, timeout)
    }

    /// Create a prober from configuration
    pub fn from_config(config: &ProbeConfig) -> Result<Self, DirectoryError> {
        Self::with_options(config.enabled, Duration::from_millis(config.timeout_ms))
    }

    /// Create a prober that reports every zone alive without probing
    pub fn disabled() -> Result<Self, DirectoryError> {
        Self::with_options(false, DEFAULT_PROBE_TIMEOUT)
    }

    /// Create a prober that sends probes to `{base}/{zone}`
    pub fn with_target_base(base: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let mut prober = Self::new(timeout)?;
        prober.target_base = Some(base.trim_end_matches('/').to_string());
        Ok(prober)
    }

    fn with_options(enabled: bool, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zonedir/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DirectoryError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            enabled,
            timeout,
            target_base: None,
        })
    }

    /// Whether probes make network calls
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send the HEAD request and return the response status
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Timeout` or `ProbeError::Transport` if no response
    /// was received, or `ProbeError::ServerError` for a 5xx response
    pub async fn check(&self, zone: &str) -> Result<StatusCode, ProbeError> {
        let url = self.target_url(zone)?;

        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(ProbeError::from_reqwest)?;

        let status = response.status();
        if Self::counts_as_alive(status) {
            Ok(status)
        } else {
            Err(ProbeError::ServerError(status.as_u16()))
        }
    }

    /// Any answer below 500 means the zone is serving
    fn counts_as_alive(status: StatusCode) -> bool {
        status.as_u16() < 500
    }

    /// Build the probe URL for a zone
    fn target_url(&self, zone: &str) -> Result<Url, ProbeError> {
        if zone.is_empty() || zone.contains(['/', ' ', '?', '#', '@']) {
            return Err(ProbeError::InvalidTarget(zone.to_string()));
        }

        let raw = match &self.target_base {
            Some(base) => format!("{base}/{zone}"),
            None => format!("https://{zone}"),
        };

        Url::parse(&raw).map_err(|_| ProbeError::InvalidTarget(zone.to_string()))
    }
}

#[async_trait]
impl LivenessProber for HttpProber {
    async fn probe(&self, zone: &str) -> bool {
        if !self.enabled {
            metrics::record_probe(ProbeOutcome::Skipped);
            return true;
        }

        tracing::trace!(zone, "Probing zone");

        match self.check(zone).await {
            Ok(status) => {
                tracing::debug!(zone, status = status.as_u16(), "Zone is alive");
                metrics::record_probe(ProbeOutcome::Alive);
                true
            }
            Err(e) => {
                tracing::warn!(zone, kind = e.kind(), error = %e, "Zone failed liveness probe");
                metrics::record_probe(ProbeOutcome::Dead);
                false
            }
        }
    }
}
