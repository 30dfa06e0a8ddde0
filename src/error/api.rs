//! Google API error envelopes (`{"error": {...}}`) shared by Firestore and FCM.

use serde::Deserialize;

const FCM_ERROR_TYPE: &str = "type.googleapis.com/google.firebase.fcm.v1.FcmError";

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleApiError,
}

/// Decoded Google API error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    /// Canonical status, e.g. `NOT_FOUND`, `UNAVAILABLE`
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl GoogleApiError {
    /// Parse a response body, falling back to the raw text when it is not an envelope.
    pub fn from_body(http_status: u16, body: &str) -> Self {
        match serde_json::from_str::<GoogleErrorEnvelope>(body) {
            Ok(envelope) => envelope.error,
            Err(_) => Self {
                code: http_status,
                message: body.trim().to_string(),
                status: String::new(),
                details: Vec::new(),
            },
        }
    }

    /// FCM-specific error code (`UNREGISTERED`, `QUOTA_EXCEEDED`, ...) when present.
    pub fn fcm_error_code(&self) -> Option<&str> {
        self.details
            .iter()
            .filter(|detail| detail.get("@type").and_then(|t| t.as_str()) == Some(FCM_ERROR_TYPE))
            .find_map(|detail| detail.get("errorCode").and_then(|c| c.as_str()))
    }

    /// Most specific code available: FCM error code, then canonical status.
    pub fn best_code(&self) -> &str {
        match self.fcm_error_code() {
            Some(code) => code,
            None if !self.status.is_empty() => &self.status,
            None => "UNKNOWN",
        }
    }
}
