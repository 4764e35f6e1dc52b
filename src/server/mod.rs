//! HTTP layer serving the zone directory
//!
//! # Routes
//!
//! ```text
//! GET /               directory (?cache=false forces a refresh)
//! GET /health         health summary
//! GET /health/live    liveness
//! GET /health/ready   ready once the first refresh committed
//! GET /metrics        Prometheus text exposition
//! *                   404 {"status": 404}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use zonedir::config::Config;
//! use zonedir::server::ZonedirServer;
//!
//! let server = ZonedirServer::new(Config::from_env()?)?;
//! server.start_with_shutdown(async {
//!     tokio::signal::ctrl_c().await.ok();
//! }).await?;
//! ```

pub mod api;
pub mod app;
pub mod health;

pub use api::{create_router, DirectoryQuery, DirectoryResponse, NotFoundResponse};
pub use app::{AppState, ServerError, ServerInfo, ZonedirServer};
pub use health::{HealthChecker, HealthResponse, HealthStatus};
