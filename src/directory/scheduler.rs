//! Refresh scheduler
//!
//! Owns the current [`Snapshot`] and replaces it on a fixed period and on
//! demand. The host process controls the lifecycle explicitly: [`RefreshScheduler::start`]
//! performs the first refresh and arms the timer, [`RefreshScheduler::stop`]
//! releases it.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::assembler::{AssemblyReport, DirectoryAssembler};
use crate::config::RefreshConfig;
use crate::metrics;
use crate::models::Snapshot;
use crate::utils::error::DirectoryError;

/// Shortest accepted refresh period
const MIN_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// Refresh Events
// ============================================================================

/// What caused a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// First refresh performed by `start`
    Startup,
    /// Periodic timer tick
    Timer,
    /// Explicit `refresh_now` call
    OnDemand,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Timer => "timer",
            Self::OnDemand => "on_demand",
        }
    }
}

/// Events emitted after each committed refresh
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// Pagination ran to the end of the listing
    Completed {
        trigger: RefreshTrigger,
        captured_at: DateTime<Utc>,
        zones: usize,
    },

    /// A page failed; the snapshot holds only the pages before it
    Truncated {
        trigger: RefreshTrigger,
        captured_at: DateTime<Utc>,
        zones: usize,
        failed_page: u32,
    },
}

impl RefreshEvent {
    pub fn trigger(&self) -> RefreshTrigger {
        match self {
            Self::Completed { trigger, .. } | Self::Truncated { trigger, .. } => *trigger,
        }
    }

    pub fn zones(&self) -> usize {
        match self {
            Self::Completed { zones, .. } | Self::Truncated { zones, .. } => *zones,
        }
    }
}

// ============================================================================
// Refresh Scheduler
// ============================================================================

/// Handle for the armed timer task
struct TimerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

/// Periodically rebuilds the directory snapshot
pub struct RefreshScheduler {
    assembler: Arc<DirectoryAssembler>,
    interval: Duration,
    single_flight: bool,
    current: RwLock<Arc<Snapshot>>,
    /// Serializes refreshes when `single_flight` is set
    refresh_lock: tokio::sync::Mutex<()>,
    refreshes: AtomicU64,
    event_sender: broadcast::Sender<RefreshEvent>,
    timer: Mutex<Option<TimerHandle>>,
}

impl RefreshScheduler {
    /// Create a new scheduler holding an empty snapshot
    pub fn new(assembler: Arc<DirectoryAssembler>, config: &RefreshConfig) -> Self {
        Self::build(
            assembler,
            Duration::from_secs(config.interval_secs),
            config.single_flight,
        )
    }

    /// Create with a custom period, single-flight enabled
    pub fn with_interval(assembler: Arc<DirectoryAssembler>, interval: Duration) -> Self {
        Self::build(assembler, interval, true)
    }

    fn build(assembler: Arc<DirectoryAssembler>, interval: Duration, single_flight: bool) -> Self {
        let (event_sender, _) = broadcast::channel(16);

        Self {
            assembler,
            // interval_at panics on a zero period
            interval: interval.max(MIN_INTERVAL),
            single_flight,
            current: RwLock::new(Arc::new(Snapshot::empty())),
            refresh_lock: tokio::sync::Mutex::new(()),
            refreshes: AtomicU64::new(0),
            event_sender,
            timer: Mutex::new(None),
        }
    }

    /// Subscribe to refresh events
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.event_sender.subscribe()
    }

    /// Current snapshot; never triggers work
    pub async fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Refresh period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of committed refreshes
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Assemble a new snapshot now, swap it in and return it
    pub async fn refresh_now(&self) -> Arc<Snapshot> {
        self.refresh(RefreshTrigger::OnDemand).await
    }

    async fn refresh(&self, trigger: RefreshTrigger) -> Arc<Snapshot> {
        if !self.single_flight {
            return self.run_cycle(trigger).await;
        }

        let seen = self.refresh_count();
        let _guard = self.refresh_lock.lock().await;

        // A cycle that committed while we waited already answers this request
        if self.refresh_count() > seen {
            tracing::debug!(
                trigger = trigger.as_str(),
                "Joined in-flight refresh instead of starting another"
            );
            return self.current().await;
        }

        self.run_cycle(trigger).await
    }

    async fn run_cycle(&self, trigger: RefreshTrigger) -> Arc<Snapshot> {
        tracing::debug!(trigger = trigger.as_str(), "Starting refresh cycle");

        let (snapshot, report) = self.assembler.assemble_with_report().await;
        let snapshot = Arc::new(snapshot);
        self.commit(Arc::clone(&snapshot), &report, trigger).await;

        snapshot
    }

    /// Swap in a new snapshot; last writer wins
    async fn commit(&self, snapshot: Arc<Snapshot>, report: &AssemblyReport, trigger: RefreshTrigger) {
        let captured_at = snapshot.captured_at;
        let zones = snapshot.len();

        *self.current.write().await = snapshot;
        self.refreshes.fetch_add(1, Ordering::SeqCst);

        metrics::record_refresh(report.elapsed.as_secs_f64(), zones, report.truncated());

        let event = match &report.stop {
            super::assembler::StopReason::Failed { page, .. } => RefreshEvent::Truncated {
                trigger,
                captured_at,
                zones,
                failed_page: *page,
            },
            super::assembler::StopReason::EmptyPage { .. } => RefreshEvent::Completed {
                trigger,
                captured_at,
                zones,
            },
        };

        // No subscribers is fine
        let _ = self.event_sender.send(event);
    }

    /// Perform the first refresh, then arm the periodic timer
    ///
    /// Returns the first snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::AlreadyRunning` if the timer is already armed
    pub async fn start(self: &Arc<Self>) -> Result<Arc<Snapshot>, DirectoryError> {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        {
            let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
            if timer.is_some() {
                return Err(DirectoryError::AlreadyRunning);
            }
            *timer = Some(TimerHandle {
                shutdown,
                task: None,
            });
        }

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Starting refresh scheduler"
        );

        let first = self.refresh(RefreshTrigger::Startup).await;

        let scheduler = Arc::clone(self);
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        scheduler.refresh(RefreshTrigger::Timer).await;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }

            tracing::debug!("Refresh timer stopped");
        });

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        match timer.as_mut() {
            Some(handle) => handle.task = Some(task),
            // stop() ran during the first refresh; the task sees the closed
            // channel and exits on its own
            None => drop(task),
        }

        Ok(first)
    }

    /// Release the timer
    ///
    /// An in-flight refresh runs to completion before the timer task exits.
    /// Returns false if the scheduler was not running.
    pub async fn stop(&self) -> bool {
        let handle = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            return false;
        };

        let _ = handle.shutdown.send(true);
        if let Some(task) = handle.task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Refresh timer task ended abnormally");
            }
        }

        tracing::info!("Refresh scheduler stopped");
        true
    }

    /// Whether the timer is armed
    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Get scheduler status
    pub async fn status(&self) -> SchedulerStatus {
        let current = self.current().await;

        SchedulerStatus {
            is_running: self.is_running(),
            interval: self.interval,
            single_flight: self.single_flight,
            refreshes: self.refresh_count(),
            captured_at: current.captured_at,
            zones: current.len(),
        }
    }
}

/// Scheduler status information
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub interval: Duration,
    pub single_flight: bool,
    pub refreshes: u64,
    pub captured_at: DateTime<Utc>,
    pub zones: usize,
}

// ============================================================================
// Tests
// ============================================================================
