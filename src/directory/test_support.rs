//! In-memory fetcher and prober used by the directory unit tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::fetcher::{ZonePage, ZonePageFetcher};
use super::prober::LivenessProber;
use crate::models::RawZone;
use crate::utils::error::FetchError;

/// Canned response for one page index
#[derive(Debug, Clone)]
pub enum CannedPage {
    Records(Vec<RawZone>),
    Status(u16),
    Unsuccessful(Vec<String>),
}

/// Serves canned pages; unknown page indexes return an empty page
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<u32, CannedPage>>,
    requested: Mutex<Vec<u32>>,
    delay: Option<Duration>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn page(self, index: u32, zones: &[(&str, &str)]) -> Self {
        self.set_page(index, zones);
        self
    }

    pub fn failing(self, index: u32, status: u16) -> Self {
        self.set_failing(index, status);
        self
    }

    /// Make a page fail with the given HTTP status
    pub fn set_failing(&self, index: u32, status: u16) {
        self.pages
            .lock()
            .unwrap()
            .insert(index, CannedPage::Status(status));
    }

    pub fn unsuccessful(self, index: u32, errors: &[&str]) -> Self {
        self.pages.lock().unwrap().insert(
            index,
            CannedPage::Unsuccessful(errors.iter().map(|e| e.to_string()).collect()),
        );
        self
    }

    /// Replace the records served for a page
    pub fn set_page(&self, index: u32, zones: &[(&str, &str)]) {
        let records = zones.iter().map(|(n, s)| RawZone::new(*n, *s)).collect();
        self.pages
            .lock()
            .unwrap()
            .insert(index, CannedPage::Records(records));
    }

    /// Page indexes requested so far, in order
    pub fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }

    /// Number of times page 1 was requested, i.e. cycles started
    pub fn cycles(&self) -> usize {
        self.requested().iter().filter(|p| **p == 1).count()
    }
}

#[async_trait]
impl ZonePageFetcher for FakeFetcher {
    async fn fetch_page(&self, page: u32) -> Result<ZonePage, FetchError> {
        self.requested.lock().unwrap().push(page);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let canned = self.pages.lock().unwrap().get(&page).cloned();
        match canned {
            Some(CannedPage::Records(records)) => Ok(ZonePage::new(page, records)),
            Some(CannedPage::Status(code)) => Err(FetchError::Status(code)),
            Some(CannedPage::Unsuccessful(errors)) => Ok(ZonePage::unsuccessful(page, errors)),
            None => Ok(ZonePage::new(page, Vec::new())),
        }
    }
}

/// Reports zones alive unless listed as dead, counting calls
#[derive(Default)]
pub struct FakeProber {
    dead: HashSet<String>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeProber {
    pub fn new(dead: &[&str]) -> Self {
        Self {
            dead: dead.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Every probe sleeps for `delay` before answering alive
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessProber for FakeProber {
    async fn probe(&self, zone: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        !self.dead.contains(zone)
    }
}
