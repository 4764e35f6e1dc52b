//! Error types for the zone directory
//!
//! This module defines the domain error types for fetching, probing and
//! refreshing the directory.

use thiserror::Error;

/// Errors that can occur while fetching a page of zones
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network, DNS or TLS failure reaching the listing endpoint
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-2xx response status
    #[error("Unexpected response status: {0}")]
    Status(u16),

    /// 2xx response with a body that could not be decoded
    #[error("Malformed response payload: {0}")]
    Protocol(String),

    /// Payload decoded but reported `success: false`
    #[error("Listing endpoint reported failure: {errors}")]
    Unsuccessful { errors: String },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Classify a reqwest error into timeout or transport
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Protocol(err.to_string())
        } else {
            Self::Transport(err)
        }
    }

    /// Short stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::Protocol(_) => "protocol",
            Self::Unsuccessful { .. } => "unsuccessful",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// Errors that can occur during a liveness probe
///
/// Probes never surface these to callers; they are logged and turned into
/// a not-alive result.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Request exceeded the probe timeout
    #[error("Probe timed out")]
    Timeout,

    /// No response at all (DNS, connect, TLS)
    #[error("Probe failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Zone answered with a server error
    #[error("Zone answered with server error: {0}")]
    ServerError(u16),

    /// Zone name could not be turned into a URL
    #[error("Invalid probe target: {0}")]
    InvalidTarget(String),
}

impl ProbeError {
    /// Classify a reqwest error into timeout or transport
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }

    /// Short stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::ServerError(_) => "server_error",
            Self::InvalidTarget(_) => "invalid_target",
        }
    }
}

/// General directory errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Scheduler already started
    #[error("Refresh scheduler is already running")]
    AlreadyRunning,
}
