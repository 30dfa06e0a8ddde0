use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::config::NotificationConfig;
use crate::firestore::{DocumentPath, DocumentStore, StoreError};
use crate::metrics::{PushMetrics, RelayMetrics, StoreMetrics};
use crate::push::{PushError, PushGateway};

use super::{MessageComposer, RecipientProfile, TriggerEvent, TriggerRecord};

/// Why a recipient could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    ProfileMissing,
    TokenMissing,
}

/// Terminal result of handling one trigger. Only `Delivered` removes the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RelayOutcome {
    /// Trigger of another type; nothing was read or written
    Ignored { trigger_type: Option<String> },
    /// Matching type but required fields are absent; trigger kept
    Malformed { missing: Vec<&'static str> },
    /// No profile or no push token for the admin; trigger kept
    RecipientUnresolved {
        admin_uid: String,
        reason: UnresolvedReason,
    },
    /// Notification accepted by the gateway and trigger deleted
    Delivered { admin_uid: String, message_id: String },
}

impl RelayOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RelayOutcome::Ignored { .. } => "ignored",
            RelayOutcome::Malformed { .. } => "malformed",
            RelayOutcome::RecipientUnresolved { .. } => "unresolved",
            RelayOutcome::Delivered { .. } => "delivered",
        }
    }
}

/// Failures surfaced to the event source. The trigger is never deleted when one is returned
/// before the send succeeds.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to look up recipient profile: {0}")]
    Lookup(#[source] StoreError),

    #[error("Failed to send notification: {0}")]
    Delivery(#[source] PushError),

    #[error("Notification sent but trigger cleanup failed: {0}")]
    Cleanup(#[source] StoreError),
}

impl RelayError {
    /// Whether the event source should redeliver
    pub fn is_transient(&self) -> bool {
        match self {
            RelayError::Lookup(e) | RelayError::Cleanup(e) => e.is_transient(),
            RelayError::Delivery(e) => e.is_transient(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Lookup(_) => "RECIPIENT_LOOKUP_FAILED",
            RelayError::Delivery(_) => "DELIVERY_FAILED",
            RelayError::Cleanup(_) => "CLEANUP_FAILED",
        }
    }
}

/// Turns fingerprint-authentication triggers into push notifications for the team admin.
pub struct NotificationRelayHandler {
    store: Arc<dyn DocumentStore>,
    push: Arc<dyn PushGateway>,
    composer: MessageComposer,
    trigger_type: String,
    users_collection: String,
    default_utc_offset_minutes: i32,
}

impl NotificationRelayHandler {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        push: Arc<dyn PushGateway>,
        notification: &NotificationConfig,
        users_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            push,
            composer: MessageComposer::new(notification),
            trigger_type: notification.trigger_type.clone(),
            users_collection: users_collection.into(),
            default_utc_offset_minutes: notification.default_utc_offset_minutes,
        }
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend_type()
    }

    pub fn push_gateway(&self) -> &'static str {
        self.push.gateway_type()
    }

    /// Handle one newly created trigger document.
    ///
    /// Order is lookup, send, delete. The trigger is deleted only once the
    /// gateway has accepted the message.
    #[tracing::instrument(name = "relay.handle", skip(self, event), fields(trigger = %event.path))]
    pub async fn handle(&self, event: TriggerEvent) -> Result<RelayOutcome, RelayError> {
        let result = self.process(&event).await;
        match &result {
            Ok(outcome) => RelayMetrics::record_outcome(outcome.label()),
            Err(_) => RelayMetrics::record_outcome("failed"),
        }
        result
    }

    async fn process(&self, event: &TriggerEvent) -> Result<RelayOutcome, RelayError> {
        let record = TriggerRecord::from_document(&event.document);
        if !record.is_type(&self.trigger_type) {
            tracing::debug!(trigger_type = ?record.trigger_type, "Ignoring trigger of another type");
            return Ok(RelayOutcome::Ignored {
                trigger_type: record.trigger_type,
            });
        }

        let auth = match record.into_fingerprint_auth(event.created_at()) {
            Ok(auth) => auth,
            Err(missing) => {
                tracing::warn!(missing = ?missing, "Trigger is missing required fields");
                return Ok(RelayOutcome::Malformed { missing });
            }
        };

        let profile_path = DocumentPath::new(&self.users_collection, &auth.admin_uid);
        let profile = self.store.get(&profile_path).await.map_err(|e| {
            StoreMetrics::record_error("get");
            tracing::error!(error = %e, admin_uid = %auth.admin_uid, "Failed to read admin profile");
            RelayError::Lookup(e)
        })?;

        let profile = match profile {
            Some(doc) => RecipientProfile::from_document(&doc),
            None => {
                tracing::warn!(admin_uid = %auth.admin_uid, "Admin profile not found");
                return Ok(RelayOutcome::RecipientUnresolved {
                    admin_uid: auth.admin_uid,
                    reason: UnresolvedReason::ProfileMissing,
                });
            }
        };

        let token = match profile.fcm_token.as_deref() {
            Some(token) => token,
            None => {
                tracing::warn!(admin_uid = %auth.admin_uid, "Admin has no FCM token");
                return Ok(RelayOutcome::RecipientUnresolved {
                    admin_uid: auth.admin_uid,
                    reason: UnresolvedReason::TokenMissing,
                });
            }
        };

        let offset = profile.display_offset(self.default_utc_offset_minutes);
        let message = self.composer.compose(&auth, offset, token);

        let started = Instant::now();
        let sent = self.push.send(&message).await;
        PushMetrics::record_send_duration(started.elapsed());

        let receipt = sent.map_err(|e| {
            let kind = e.kind();
            PushMetrics::record_failure(kind.as_str());
            tracing::error!(
                error = %e,
                kind = kind.as_str(),
                admin_uid = %auth.admin_uid,
                task_id = %auth.task_id,
                "Error sending notification"
            );
            RelayError::Delivery(e)
        })?;

        tracing::info!(
            admin_uid = %auth.admin_uid,
            task_id = %auth.task_id,
            message_id = %receipt.message_id,
            "Notification sent to admin"
        );

        self.store.delete(&event.path).await.map_err(|e| {
            StoreMetrics::record_error("delete");
            tracing::error!(error = %e, "Notification sent but trigger could not be deleted");
            RelayError::Cleanup(e)
        })?;
        RelayMetrics::record_cleanup();

        Ok(RelayOutcome::Delivered {
            admin_uid: auth.admin_uid,
            message_id: receipt.message_id,
        })
    }
}
