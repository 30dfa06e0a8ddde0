//! Fingerprint-authentication notification relay.
//!
//! A trigger document flows through `NotificationRelayHandler::handle`:
//! type filter, admin profile lookup, message composition, push send, and
//! finally deletion of the trigger once the send has been accepted.

mod handler;
mod payload;
mod recipient;
mod trigger;

pub use handler::{NotificationRelayHandler, RelayError, RelayOutcome, UnresolvedReason};
pub use payload::{format_event_time, MessageComposer};
pub use recipient::RecipientProfile;
pub use trigger::{FingerprintAuth, TriggerEvent, TriggerRecord};
