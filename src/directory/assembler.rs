//! Directory assembly: pagination, probing and classification
//!
//! One call to [`DirectoryAssembler::assemble`] is one refresh cycle. Pages
//! are fetched sequentially starting at page 1 until a page comes back empty
//! or fails. Zones on a fetched page are probed concurrently and classified
//! before the next page is requested. A failure never escapes the cycle:
//! zones gathered so far are kept and the cycle ends.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::directory::fetcher::{ZonePage, ZonePageFetcher};
use crate::directory::prober::LivenessProber;
use crate::metrics;
use crate::models::{RawZone, Snapshot, Zone, ZoneStatus};
use crate::utils::error::FetchError;
use crate::utils::format_ms;

/// Why pagination stopped
#[derive(Debug)]
pub enum StopReason {
    /// A page came back with zero records; the normal end of the listing
    EmptyPage { page: u32 },

    /// A page fetch failed; later pages were not attempted
    Failed { page: u32, error: FetchError },
}

impl StopReason {
    /// Whether the cycle ended early because of a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Summary of one refresh cycle
#[derive(Debug)]
pub struct AssemblyReport {
    /// Pages that returned records
    pub pages_fetched: u32,

    /// Zones in the resulting snapshot
    pub zones: usize,

    /// Liveness probes issued
    pub probes: usize,

    /// Duplicate names dropped across pages
    pub duplicates: usize,

    pub stop: StopReason,

    pub elapsed: Duration,
}

impl AssemblyReport {
    /// Whether the snapshot is missing pages because of a failure
    pub fn truncated(&self) -> bool {
        self.stop.is_failure()
    }
}

/// Drives the page fetcher across all pages and classifies every zone
pub struct DirectoryAssembler {
    fetcher: Arc<dyn ZonePageFetcher>,
    prober: Arc<dyn LivenessProber>,
}

impl DirectoryAssembler {
    /// Create a new assembler
    pub fn new(fetcher: Arc<dyn ZonePageFetcher>, prober: Arc<dyn LivenessProber>) -> Self {
        Self { fetcher, prober }
    }

    /// Run one refresh cycle and return the new snapshot
    pub async fn assemble(&self) -> Snapshot {
        self.assemble_with_report().await.0
    }

    /// Run one refresh cycle, returning the snapshot and a cycle summary
    pub async fn assemble_with_report(&self) -> (Snapshot, AssemblyReport) {
        let start = Instant::now();
        tracing::info!("Updating zones");

        let mut zones: Vec<Zone> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut pages_fetched = 0;
        let mut probes = 0;
        let mut duplicates = 0;
        let mut page_index = 1;

        let stop = loop {
            let outcome = self.fetcher.fetch_page(page_index).await;

            let page = match Self::next_page(page_index, outcome) {
                Ok(page) => page,
                Err(stop) => break stop,
            };

            tracing::debug!(
                page = page_index,
                records = page.records.len(),
                total_pages = ?page.total_pages,
                "Fetched zone page"
            );

            probes += page.records.iter().filter(|r| r.needs_probe()).count();

            for zone in self.classify_page(page.records).await {
                if seen.insert(zone.name.clone()) {
                    zones.push(zone);
                } else {
                    tracing::debug!(zone = %zone.name, page = page_index, "Dropping duplicate zone");
                    duplicates += 1;
                }
            }

            pages_fetched += 1;
            page_index += 1;
        };

        if let StopReason::Failed { page, error } = &stop {
            tracing::error!(
                page,
                kind = error.kind(),
                error = %error,
                kept = zones.len(),
                "Zone page fetch failed, ending refresh cycle"
            );
            metrics::record_page_failure(error.kind());
        }

        let elapsed = start.elapsed();
        tracing::info!(
            zones = zones.len(),
            pages = pages_fetched,
            truncated = stop.is_failure(),
            "Found {} zones, took {}",
            zones.len(),
            format_ms(elapsed)
        );

        let report = AssemblyReport {
            pages_fetched,
            zones: zones.len(),
            probes,
            duplicates,
            stop,
            elapsed,
        };

        (Snapshot::new(zones), report)
    }

    /// Pagination stop predicate
    ///
    /// Returns the page to classify, or the reason pagination ends. A failed
    /// fetch, a `success: false` payload and a page with zero records all end
    /// pagination; only the first two count as failures.
    pub fn next_page(
        page_index: u32,
        outcome: Result<ZonePage, FetchError>,
    ) -> Result<ZonePage, StopReason> {
        match outcome {
            Err(error) => Err(StopReason::Failed {
                page: page_index,
                error,
            }),
            Ok(page) if !page.had_success => Err(StopReason::Failed {
                page: page_index,
                error: FetchError::Unsuccessful {
                    errors: page.errors.join("; "),
                },
            }),
            Ok(page) if page.is_empty() => Err(StopReason::EmptyPage { page: page_index }),
            Ok(page) => Ok(page),
        }
    }

    /// Classify every record on a page, probing active zones concurrently
    ///
    /// Output order matches input order.
    async fn classify_page(&self, records: Vec<RawZone>) -> Vec<Zone> {
        let tasks = records.into_iter().map(|raw| {
            let prober = Arc::clone(&self.prober);
            async move {
                let alive = raw.needs_probe() && prober.probe(&raw.name).await;
                let status = ZoneStatus::classify(&raw.status, || alive);
                Zone::new(raw.name, status)
            }
        });

        join_all(tasks).await
    }
}
