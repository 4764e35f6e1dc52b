//! Route handlers for the directory server

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::RequestOptions;
use crate::metrics;
use crate::models::{Snapshot, Zone};
use crate::utils::format_since;

use super::app::AppState;
use super::health::create_health_router;

// ============================================================================
// API Response Types
// ============================================================================

/// Directory listing returned by `GET /`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryResponse {
    pub status: u16,

    /// Capture time in milliseconds since the Unix epoch
    pub last_updated: i64,

    /// Capture time relative to the response, e.g. "3 minutes ago"
    pub last_updated_format: String,

    pub domains: Vec<Zone>,
}

impl DirectoryResponse {
    pub fn from_snapshot(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            last_updated: snapshot.captured_at.timestamp_millis(),
            last_updated_format: format_since(snapshot.captured_at, now),
            domains: snapshot.zones.clone(),
        }
    }
}

/// Body for unknown routes
#[derive(Debug, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub status: u16,
}

/// Query string accepted by `GET /`
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    pub cache: Option<String>,
}

impl DirectoryQuery {
    /// Only an explicit `cache=false` bypasses the cache
    pub fn options(&self) -> RequestOptions {
        match self.cache.as_deref() {
            Some(value) if value.eq_ignore_ascii_case("false") => RequestOptions::bypass(),
            _ => RequestOptions::default(),
        }
    }
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_directory))
        .route("/metrics", get(get_metrics))
        .with_state(state.clone())
        .merge(create_health_router(state))
        .fallback(not_found)
}

// ============================================================================
// Handlers
// ============================================================================

/// Serve the directory
///
/// Always 200: an outage shows up as an empty or stale listing.
async fn get_directory(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> impl IntoResponse {
    let snapshot = state.cache.get_with(query.options()).await;

    (
        StatusCode::OK,
        Json(DirectoryResponse::from_snapshot(&snapshot, Utc::now())),
    )
}

async fn get_metrics() -> axum::response::Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            status: StatusCode::NOT_FOUND.as_u16(),
        }),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ZoneStatus;

    #[test]
    fn test_directory_response_shape() {
        let captured = Utc::now() - chrono::Duration::seconds(90);
        let snapshot = Snapshot::captured(
            captured,
            vec![
                Zone::new("a.com", ZoneStatus::Active),
                Zone::new("b.com", ZoneStatus::Remote("pending".to_string())),
            ],
        );

        let now = captured + chrono::Duration::seconds(90);
        let response = DirectoryResponse::from_snapshot(&snapshot, now);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], 200);
        assert_eq!(json["lastUpdated"], captured.timestamp_millis());
        assert_eq!(json["lastUpdatedFormat"], "1 minute ago");
        assert_eq!(json["domains"][1]["status"], "pending");
    }

    #[test]
    fn test_query_options() {
        let query = DirectoryQuery {
            cache: Some("false".to_string()),
        };
        assert!(!query.options().cache);

        let query = DirectoryQuery {
            cache: Some("true".to_string()),
        };
        assert!(query.options().cache);

        assert!(DirectoryQuery::default().options().cache);
    }
}
