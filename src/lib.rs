//! zonedir - Cached directory of DNS zones
//!
//! Keeps a locally cached directory of the zones owned by an account, each
//! annotated with a liveness-derived status, and serves it with bounded
//! staleness.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration loading and validation
//! - [`directory`] - Page fetcher, liveness prober, assembler, scheduler and cache façade
//! - [`models`] - Zones, statuses, snapshots and listing wire types
//! - [`metrics`] - Prometheus metrics for refresh cycles, page failures and probes
//! - [`server`] - axum HTTP layer exposing the directory
//! - [`utils`] - Time formatting helpers and domain error types
//!
//! # Example
//!
//! ```no_run
//! use zonedir::config::Config;
//! use zonedir::directory::DirectoryCache;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let cache = DirectoryCache::from_config(&config)?;
//!     cache.scheduler().start().await?;
//!
//!     let snapshot = cache.get(true).await;
//!     println!("{} zones", snapshot.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::directory::{
        DirectoryAssembler, DirectoryCache, LivenessProber, RefreshScheduler, RequestOptions,
        ZonePageFetcher,
    };
    pub use crate::error::{Error, Result};
    pub use crate::models::{RawZone, Snapshot, Zone, ZoneStatus};
    pub use crate::server::ZonedirServer;
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use models::{Snapshot, Zone, ZoneStatus};
