use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::firestore::Document;
use crate::relay::RelayOutcome;

/// CloudEvent type for document creation
pub const DOCUMENT_CREATED_EVENT: &str = "google.cloud.firestore.document.v1.created";

/// Payload of a Firestore document event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEventData {
    /// Snapshot after the change (absent for deletions)
    #[serde(default)]
    pub value: Option<Document>,
    /// Snapshot before the change (absent for creations)
    #[serde(default)]
    pub old_value: Option<Document>,
    #[serde(default)]
    pub update_mask: Option<DocumentMask>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    #[serde(default)]
    pub field_paths: Vec<String>,
}

/// CloudEvent attributes carried as `ce-*` headers
#[derive(Debug, Clone, Default)]
pub struct CloudEventHeaders {
    pub id: Option<String>,
    pub event_type: Option<String>,
    pub source: Option<String>,
    /// e.g. `documents/notifications_trigger/abc`
    pub subject: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

impl CloudEventHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            id: get("ce-id"),
            event_type: get("ce-type"),
            source: get("ce-source"),
            subject: get("ce-subject"),
            time: get("ce-time")
                .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
                .map(|t| t.with_timezone(&Utc)),
        }
    }

    /// Creation events, including the `.withAuthContext` variant
    pub fn is_document_created(&self) -> bool {
        match self.event_type.as_deref() {
            Some(event_type) => event_type
                .strip_prefix(DOCUMENT_CREATED_EVENT)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.')),
            // Plain POSTs without CloudEvent headers are treated as creations
            None => true,
        }
    }
}

/// Response body for the event source
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub event_id: String,
    /// Why the event never reached the relay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    #[serde(flatten)]
    pub outcome: Option<RelayOutcome>,
}

impl TriggerResponse {
    pub fn skipped(event_id: String, reason: impl Into<String>) -> Self {
        Self {
            event_id,
            skipped: Some(reason.into()),
            outcome: None,
        }
    }

    pub fn handled(event_id: String, outcome: RelayOutcome) -> Self {
        Self {
            event_id,
            skipped: None,
            outcome: Some(outcome),
        }
    }
}
