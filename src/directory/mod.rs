//! Zone directory cache
//!
//! Maintains a locally cached directory of the account's DNS zones, each
//! annotated with a liveness-derived status.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              DirectoryCache                  │
//! │   get(use_cache) ──► current / refresh_now   │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │             RefreshScheduler                 │
//! │  - owns the current Snapshot                 │
//! │  - periodic timer, explicit start/stop       │
//! │  - optional single-flight guard              │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │            DirectoryAssembler                │
//! │  page 1..n sequentially, probes per page     │
//! │  concurrently, stops on empty or failed page │
//! └──────────┬───────────────────────┬───────────┘
//!            │                       │
//!   ┌────────▼─────────┐   ┌─────────▼────────┐
//!   │ ZonePageFetcher  │   │  LivenessProber  │
//!   │ (GET /zones)     │   │  (HEAD https://) │
//!   └──────────────────┘   └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use zonedir::config::Config;
//! use zonedir::directory::DirectoryCache;
//!
//! let config = Config::from_env()?;
//! let cache = DirectoryCache::from_config(&config)?;
//! cache.scheduler().start().await?;
//!
//! let snapshot = cache.get(true).await;
//! println!("{} zones", snapshot.len());
//! ```

pub mod assembler;
pub mod cache;
pub mod fetcher;
pub mod prober;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

pub use assembler::{AssemblyReport, DirectoryAssembler, StopReason};
pub use cache::{DirectoryCache, DirectoryView, RequestOptions};
pub use fetcher::{CloudflareFetcher, ZonePage, ZonePageFetcher};
pub use prober::{HttpProber, LivenessProber, DEFAULT_PROBE_TIMEOUT};
pub use scheduler::{RefreshEvent, RefreshScheduler, RefreshTrigger, SchedulerStatus};

use crate::config::Config;
use crate::utils::error::DirectoryError;

impl DirectoryCache {
    /// Wire the HTTP fetcher, prober and scheduler from configuration
    ///
    /// The scheduler is not started.
    pub fn from_config(config: &Config) -> Result<Self, DirectoryError> {
        let fetcher = Arc::new(CloudflareFetcher::from_config(&config.api)?);
        let prober = Arc::new(HttpProber::from_config(&config.probe)?);
        let assembler = Arc::new(DirectoryAssembler::new(fetcher, prober));
        let scheduler = Arc::new(RefreshScheduler::new(assembler, &config.refresh));

        Ok(Self::new(scheduler))
    }
}
