//! Health check endpoints
//!
//! - `/health/live`: the process is serving
//! - `/health/ready`: the first refresh has committed a snapshot
//! - `/health`: summary with uptime and directory state

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::app::AppState;

// ============================================================================
// Health Status Types
// ============================================================================

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but no refresh has committed yet
    Starting,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Starting => "starting",
        }
    }
}

/// Comprehensive health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_secs: u64,
    pub zones: usize,
    pub refreshes: u64,
    pub scheduler_running: bool,
    /// RFC 3339 capture time; absent until the first refresh commits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

// ============================================================================
// Health Checker
// ============================================================================

/// Tracks whether the directory has been populated
#[derive(Clone)]
pub struct HealthChecker {
    ready: Arc<AtomicBool>,
    start_time: Instant,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
        }
    }

    /// Mark the first refresh as committed
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        tracing::info!("Health check: directory marked as ready");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================================================
// Health Check Router
// ============================================================================

pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(liveness_probe))
        .route("/health/ready", get(readiness_probe))
        .route("/health", get(health_check))
        .with_state(state)
}

// ============================================================================
// Health Check Handlers
// ============================================================================

async fn liveness_probe() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": HealthStatus::Healthy })),
    )
}

async fn readiness_probe(State(state): State<AppState>) -> impl IntoResponse {
    let (code, status) = if state.health.is_ready() {
        (StatusCode::OK, HealthStatus::Healthy)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Starting)
    };

    (code, Json(serde_json::json!({ "status": status })))
}

/// Summary handler; always 200 so a cold cache never takes the process down
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.cache.scheduler().status().await;
    let ready = state.health.is_ready();

    let response = HealthResponse {
        status: if ready {
            HealthStatus::Healthy
        } else {
            HealthStatus::Starting
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.uptime_secs(),
        zones: status.zones,
        refreshes: status.refreshes,
        scheduler_running: status.is_running,
        last_updated: (status.refreshes > 0).then(|| status.captured_at.to_rfc3339()),
    };

    (StatusCode::OK, Json(response))
}
