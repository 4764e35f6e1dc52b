// Core data structures for the zone directory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote status string that makes a zone eligible for liveness probing
pub const ACTIVE_STATUS: &str = "active";

/// Status assigned to an active zone that failed its liveness probe
pub const INVALID_STATUS: &str = "invalid";

/// Classified zone status
///
/// Serialized as a plain string so remote statuses round-trip verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoneStatus {
    /// Remote reported "active" and the probe succeeded (or probing is off)
    Active,
    /// Remote reported "active" but the probe failed
    Invalid,
    /// Any other remote status, passed through unchanged
    Remote(String),
}

impl ZoneStatus {
    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => ACTIVE_STATUS,
            Self::Invalid => INVALID_STATUS,
            Self::Remote(status) => status,
        }
    }

    /// Derive the classified status from a remote status and probe result
    ///
    /// `alive` is only consulted when the remote status is "active".
    pub fn classify(remote_status: &str, alive: impl FnOnce() -> bool) -> Self {
        if remote_status != ACTIVE_STATUS {
            return Self::Remote(remote_status.to_string());
        }

        if alive() {
            Self::Active
        } else {
            Self::Invalid
        }
    }
}

impl From<String> for ZoneStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            ACTIVE_STATUS => Self::Active,
            INVALID_STATUS => Self::Invalid,
            _ => Self::Remote(value),
        }
    }
}

impl From<ZoneStatus> for String {
    fn from(value: ZoneStatus) -> Self {
        match value {
            ZoneStatus::Remote(status) => status,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A zone with its classified status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub status: ZoneStatus,
}

impl Zone {
    pub fn new(name: impl Into<String>, status: ZoneStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Zone record as reported by the listing endpoint, before reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawZone {
    pub name: String,
    pub status: String,
}

impl RawZone {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Whether this record needs a liveness probe to be classified
    pub fn needs_probe(&self) -> bool {
        self.status == ACTIVE_STATUS
    }
}

/// Immutable, timestamped, ordered collection of classified zones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub zones: Vec<Zone>,
}

impl Snapshot {
    /// Create a snapshot captured now
    pub fn new(zones: Vec<Zone>) -> Self {
        Self::captured(Utc::now(), zones)
    }

    /// Create a snapshot with an explicit capture time
    pub fn captured(captured_at: DateTime<Utc>, zones: Vec<Zone>) -> Self {
        Self { captured_at, zones }
    }

    /// Empty snapshot, used before the first refresh completes
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Age of the snapshot relative to `now`, clamped at zero
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.captured_at).to_std().unwrap_or_default()
    }

    /// Find a zone by name
    pub fn find(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Count zones with the given status
    pub fn count_status(&self, status: &ZoneStatus) -> usize {
        self.zones.iter().filter(|z| &z.status == status).count()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Listing Endpoint Wire Types
// ============================================================================

/// Response envelope returned by `GET /zones`
///
/// Informational `messages` are not decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ZonesResponse {
    pub success: bool,

    #[serde(default)]
    pub errors: Vec<ApiMessage>,

    /// `null` on failed requests
    #[serde(default)]
    pub result: Option<Vec<RawZone>>,

    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

impl ZonesResponse {
    /// Take the records, treating a missing or null result as empty
    pub fn take_records(&mut self) -> Vec<RawZone> {
        self.result.take().unwrap_or_default()
    }
}

/// Error message from the listing endpoint
///
/// Usually `{code, message}`; bare strings and other shapes are kept as-is.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiMessage {
    Text(String),
    Detailed {
        #[serde(default)]
        code: Option<i64>,
        #[serde(default)]
        message: String,
    },
    Raw(serde_json::Value),
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(message) | Self::Detailed { code: None, message } => f.write_str(message),
            Self::Detailed {
                code: Some(code),
                message,
            } => write!(f, "{code}: {message}"),
            Self::Raw(value) => write!(f, "{value}"),
        }
    }
}

/// Pagination metadata; informational only, an empty page ends pagination
#[derive(Debug, Clone, Deserialize)]
pub struct ResultInfo {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub count: Option<u32>,
    pub total_count: Option<u32>,
    pub total_pages: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_passes_through_non_active() {
        let status = ZoneStatus::classify("pending", || panic!("probe must not run"));
        assert_eq!(status, ZoneStatus::Remote("pending".to_string()));
    }

    #[test]
    fn test_classify_active() {
        assert_eq!(ZoneStatus::classify("active", || true), ZoneStatus::Active);
        assert_eq!(ZoneStatus::classify("active", || false), ZoneStatus::Invalid);
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        let zone = Zone::new("a.com", ZoneStatus::Remote("moved".to_string()));
        let json = serde_json::to_string(&zone).unwrap();
        assert_eq!(json, r#"{"name":"a.com","status":"moved"}"#);

        let zone = Zone::new("b.com", ZoneStatus::Invalid);
        let json = serde_json::to_string(&zone).unwrap();
        assert_eq!(json, r#"{"name":"b.com","status":"invalid"}"#);
    }

    #[test]
    fn test_status_from_string() {
        assert_eq!(ZoneStatus::from("active".to_string()), ZoneStatus::Active);
        assert_eq!(ZoneStatus::from("invalid".to_string()), ZoneStatus::Invalid);
        assert_eq!(
            ZoneStatus::from("deactivated".to_string()),
            ZoneStatus::Remote("deactivated".to_string())
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
    }

    #[test]
    fn test_snapshot_age_clamped() {
        let snapshot = Snapshot::new(vec![]);
        let earlier = snapshot.captured_at - chrono::Duration::seconds(5);
        assert_eq!(snapshot.age(earlier), std::time::Duration::ZERO);

        let later = snapshot.captured_at + chrono::Duration::seconds(5);
        assert_eq!(snapshot.age(later), std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_snapshot_counts() {
        let snapshot = Snapshot::new(vec![
            Zone::new("a.com", ZoneStatus::Active),
            Zone::new("b.com", ZoneStatus::Invalid),
            Zone::new("c.com", ZoneStatus::Active),
        ]);
        assert_eq!(snapshot.count_status(&ZoneStatus::Active), 2);
        assert_eq!(snapshot.find("b.com").unwrap().status, ZoneStatus::Invalid);
        assert!(snapshot.find("d.com").is_none());
    }

    #[test]
    fn test_zones_response_parsing() {
        let json = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": [
                {"id": "023e105f", "name": "a.com", "status": "active", "paused": false},
                {"id": "123e105f", "name": "b.com", "status": "pending"}
            ],
            "result_info": {"page": 1, "per_page": 50, "count": 2, "total_count": 2, "total_pages": 1}
        }"#;

        let mut response: ZonesResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        let records = response.take_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], RawZone::new("a.com", "active"));
        assert!(records[0].needs_probe());
        assert!(!records[1].needs_probe());
        assert_eq!(response.result_info.unwrap().total_pages, Some(1));
    }

    #[test]
    fn test_zones_response_failure_without_result() {
        let json = r#"{"success": false, "errors": [{"code": 9109, "message": "Invalid access token"}], "result": null}"#;
        let mut response: ZonesResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.take_records().is_empty());
        assert_eq!(response.errors[0].to_string(), "9109: Invalid access token");
    }

    #[test]
    fn test_zones_response_lenient_messages() {
        let json = r#"{
            "success": false,
            "errors": ["Rate limited", {"message": "Try later"}, 42],
            "messages": ["Zones listed", {"code": 1, "message": "ok"}],
            "result": null
        }"#;
        let response: ZonesResponse = serde_json::from_str(json).unwrap();
        let errors: Vec<String> = response.errors.iter().map(ToString::to_string).collect();
        assert_eq!(errors, vec!["Rate limited", "Try later", "42"]);
    }
}
