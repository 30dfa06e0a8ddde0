//! Push delivery gateway.
//!
//! `PushGateway` is the seam between the relay and the push provider;
//! `FcmClient` implements it on top of the FCM HTTP v1 API.

mod fcm;
mod message;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

pub use fcm::FcmClient;
pub use message::{
    AndroidConfig, AndroidNotification, AndroidPriority, ApnsConfig, ApnsPayload, Aps,
    Notification, PushMessage,
};

/// FCM error codes that are worth retrying
const TRANSIENT_FCM_CODES: &[&str] = &["UNAVAILABLE", "INTERNAL", "QUOTA_EXCEEDED"];

/// Whether a failed send may succeed if retried later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushErrorKind {
    Transient,
    Permanent,
}

impl PushErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushErrorKind::Transient => "transient",
            PushErrorKind::Permanent => "permanent",
        }
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Push request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Push gateway rejected message ({status} {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

impl PushError {
    pub fn kind(&self) -> PushErrorKind {
        let transient = match self {
            PushError::Transport(_) => true,
            PushError::Rejected { status, code, .. } => {
                *status == 429 || *status >= 500 || TRANSIENT_FCM_CODES.contains(&code.as_str())
            }
            PushError::Auth(e) => e.is_transient(),
        };

        if transient {
            PushErrorKind::Transient
        } else {
            PushErrorKind::Permanent
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == PushErrorKind::Transient
    }
}

/// Identifier returned by the gateway for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub message_id: String,
}

/// Delivers push messages to devices.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Gateway type identifier (for logs and health output)
    fn gateway_type(&self) -> &'static str;

    /// Submit one message. A single attempt; callers decide about retries.
    async fn send(&self, message: &PushMessage) -> Result<SendReceipt, PushError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16, code: &str) -> PushError {
        PushError::Rejected {
            status,
            code: code.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(rejected(503, "UNAVAILABLE").kind(), PushErrorKind::Transient);
        assert_eq!(rejected(429, "QUOTA_EXCEEDED").kind(), PushErrorKind::Transient);
        assert_eq!(rejected(500, "INTERNAL").kind(), PushErrorKind::Transient);
        assert_eq!(rejected(404, "UNREGISTERED").kind(), PushErrorKind::Permanent);
        assert_eq!(rejected(400, "INVALID_ARGUMENT").kind(), PushErrorKind::Permanent);
        assert_eq!(rejected(403, "SENDER_ID_MISMATCH").kind(), PushErrorKind::Permanent);
    }

    #[test]
    fn test_auth_errors_follow_auth_classification() {
        let err = PushError::Auth(AuthError::Credentials("missing key".into()));
        assert_eq!(err.kind(), PushErrorKind::Permanent);
        assert_eq!(err.kind().as_str(), "permanent");
    }
}
