//! Directory server implementation
//!
//! Wires the directory cache into the router and controls the scheduler
//! lifecycle around the HTTP listener.

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::directory::DirectoryCache;
use crate::metrics;

use super::api::create_router;
use super::health::HealthChecker;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: DirectoryCache,

    pub health: HealthChecker,
}

impl AppState {
    pub fn new(cache: DirectoryCache) -> Self {
        Self {
            cache,
            health: HealthChecker::new(),
        }
    }
}

// ============================================================================
// Zonedir Server
// ============================================================================

/// HTTP server for the zone directory
pub struct ZonedirServer {
    config: ServerConfig,
    state: AppState,
}

impl ZonedirServer {
    /// Create a server from a full configuration
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if validation fails and
    /// `ServerError::Init` if the HTTP clients cannot be built
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let cache =
            DirectoryCache::from_config(&config).map_err(|e| ServerError::Init(e.to_string()))?;

        Ok(Self::with_cache(cache, config.server))
    }

    /// Create a server around an existing cache
    pub fn with_cache(cache: DirectoryCache, config: ServerConfig) -> Self {
        Self {
            config,
            state: AppState::new(cache),
        }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Serve until `shutdown_signal` resolves
    ///
    /// The listener is bound before the scheduler starts, so requests that
    /// arrive during the first refresh see the empty snapshot. The scheduler
    /// is stopped after the listener drains.
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.config.bind_address;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{addr}: {e}")))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        &self,
        listener: tokio::net::TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        if let Err(e) = metrics::init_metrics() {
            tracing::warn!(error = %e, "Metrics registration failed, continuing without metrics");
        }

        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(e.to_string()))?;
        tracing::info!("Listening on {}", local_addr);

        let startup = self.start_background_tasks();

        let result = axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()));

        startup.abort();
        self.state.cache.scheduler().stop().await;

        tracing::info!("Directory server shutdown complete");
        result
    }

    /// Start the scheduler without blocking the listener
    fn start_background_tasks(&self) -> tokio::task::JoinHandle<()> {
        let scheduler = self.state.cache.scheduler().clone();
        let health = self.state.health.clone();

        tokio::spawn(async move {
            match scheduler.start().await {
                Ok(snapshot) => {
                    tracing::info!(zones = snapshot.len(), "Initial directory loaded");
                    health.mark_ready();
                }
                Err(e) => tracing::error!(error = %e, "Failed to start refresh scheduler"),
            }
        })
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            refresh_interval: self.state.cache.scheduler().interval(),
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub refresh_interval: std::time::Duration,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Zone Directory Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Refresh Interval: {}s\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.refresh_interval.as_secs(),
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled {
                "enabled"
            } else {
                "disabled"
            }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Failed to bind: {0}")]
    Bind(String),

    #[error("Server error: {0}")]
    Serve(String),
}

impl From<ServerError> for crate::error::Error {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Config(msg) => Self::Config(msg),
            other => Self::Server(other.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
