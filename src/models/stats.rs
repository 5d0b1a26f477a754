//! Stats snapshot pushed to dashboards, and the push-channel wire events.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bumped whenever a field is removed or changes meaning.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Aggregated donation statistics. Never persisted, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    /// Accepted donations only.
    pub total_donations: i64,
    pub donation_status: StatusHistogram,
    pub hospitals: Vec<HospitalStats>,
    /// Accepted donations grouped by donor type; absent types are omitted.
    pub donor_types: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistogram {
    #[serde(rename = "Accepted")]
    pub accepted: i64,
    #[serde(rename = "Rejected")]
    pub rejected: i64,
    #[serde(rename = "Pending")]
    pub pending: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HospitalStats {
    pub name: String,
    pub current: i32,
    pub target: i32,
    pub waiting: i32,
    pub beds: i32,
}

/// Frames sent from the server to dashboard clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent<'a> {
    StatsUpdate(&'a StatsSnapshot),
    StatsError(&'a str),
}

/// Frames accepted from dashboard clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    RequestStats,
}

impl ClientEvent {
    /// Parse a text frame: either a JSON envelope or the bare event name.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == "requestStats" {
            return Some(ClientEvent::RequestStats);
        }
        serde_json::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StatsSnapshot {
        StatsSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            generated_at: Utc::now(),
            total_donations: 1,
            donation_status: StatusHistogram {
                accepted: 1,
                rejected: 0,
                pending: 2,
            },
            hospitals: vec![HospitalStats {
                name: "Mercy".to_string(),
                current: 1,
                target: 10,
                waiting: 2,
                beds: 10,
            }],
            donor_types: BTreeMap::from([("student".to_string(), 1)]),
        }
    }

    #[test]
    fn snapshot_wire_shape() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["totalDonations"], 1);
        assert_eq!(json["donationStatus"]["Accepted"], 1);
        assert_eq!(json["donationStatus"]["Rejected"], 0);
        assert_eq!(json["donationStatus"]["Pending"], 2);
        assert_eq!(json["hospitals"][0]["name"], "Mercy");
        assert_eq!(json["hospitals"][0]["beds"], 10);
        assert_eq!(json["donorTypes"]["student"], 1);
        assert!(json["generatedAt"].is_string());
    }

    #[test]
    fn server_event_envelope() {
        let snap = snapshot();
        let json = serde_json::to_value(ServerEvent::StatsUpdate(&snap)).unwrap();
        assert_eq!(json["event"], "statsUpdate");
        assert_eq!(json["data"]["totalDonations"], 1);

        let json = serde_json::to_value(ServerEvent::StatsError("unavailable")).unwrap();
        assert_eq!(json["event"], "statsError");
        assert_eq!(json["data"], "unavailable");
    }

    #[test]
    fn client_event_forms() {
        assert_eq!(ClientEvent::parse("requestStats"), Some(ClientEvent::RequestStats));
        assert_eq!(
            ClientEvent::parse(r#"{"event":"requestStats"}"#),
            Some(ClientEvent::RequestStats)
        );
        assert_eq!(ClientEvent::parse(r#"{"event":"somethingElse"}"#), None);
        assert_eq!(ClientEvent::parse("hello"), None);
    }
}
