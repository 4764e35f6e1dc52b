//! Unified error handling for the zonedir crate
//!
//! Domain errors live next to the code that raises them
//! ([`DirectoryError`], [`FetchError`], [`ProbeError`] in `utils::error`,
//! `ServerError` in the server module). [`Error`] gathers those that reach
//! the CLI subcommands.
//!
//! The directory core never returns these from a refresh: page and probe
//! failures are logged, counted and folded into the snapshot.

use thiserror::Error;

pub use crate::utils::error::{DirectoryError, FetchError, ProbeError};

/// Unified error type for the zonedir crate
#[derive(Error, Debug)]
pub enum Error {
    /// Directory errors (client construction, lifecycle)
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),
}

// Config loading and validation report through anyhow
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(format!("{err:#}"))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_conversion() {
        let unified: Error = DirectoryError::AlreadyRunning.into();
        assert!(matches!(unified, Error::Directory(_)));
        assert_eq!(
            unified.to_string(),
            "Directory error: Refresh scheduler is already running"
        );
    }

    #[test]
    fn test_anyhow_becomes_config_error() {
        let err: Error = anyhow::anyhow!("api_token must not be empty")
            .context("invalid configuration")
            .into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "Config error: invalid configuration: api_token must not be empty"
        );
    }

    #[test]
    fn test_fetch_error_kind() {
        assert_eq!(FetchError::Timeout.kind(), "timeout");
        assert_eq!(FetchError::Status(500).kind(), "status");
        assert_eq!(ProbeError::ServerError(502).kind(), "server_error");
    }
}
