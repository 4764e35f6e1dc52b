//! Directory cache façade
//!
//! The public read contract: the last stored snapshot, or a forced refresh.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use super::scheduler::RefreshScheduler;
use crate::models::Snapshot;

/// Options for a directory read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Serve the stored snapshot; `false` forces a refresh first
    pub cache: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { cache: true }
    }
}

impl RequestOptions {
    pub fn bypass() -> Self {
        Self { cache: false }
    }
}

/// A snapshot together with its age at read time
#[derive(Debug, Clone)]
pub struct DirectoryView {
    pub snapshot: Arc<Snapshot>,
    pub age: Duration,
}

/// Read access to the directory owned by a [`RefreshScheduler`]
#[derive(Clone)]
pub struct DirectoryCache {
    scheduler: Arc<RefreshScheduler>,
}

impl DirectoryCache {
    pub fn new(scheduler: Arc<RefreshScheduler>) -> Self {
        Self { scheduler }
    }

    /// Get the directory
    ///
    /// With `use_cache` the stored snapshot is returned without triggering
    /// work; it is empty until the first refresh commits. Without it a full
    /// refresh runs and its snapshot is returned.
    pub async fn get(&self, use_cache: bool) -> Arc<Snapshot> {
        if use_cache {
            self.scheduler.current().await
        } else {
            tracing::debug!("Cache bypassed, refreshing directory");
            self.scheduler.refresh_now().await
        }
    }

    pub async fn get_with(&self, options: RequestOptions) -> Arc<Snapshot> {
        self.get(options.cache).await
    }

    /// Get the directory along with its age
    pub async fn view(&self, options: RequestOptions) -> DirectoryView {
        let snapshot = self.get_with(options).await;
        let age = snapshot.age(Utc::now());
        DirectoryView { snapshot, age }
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.scheduler
    }
}
