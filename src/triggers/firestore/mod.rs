//! Firestore document-created events delivered over HTTP
//!
//! Eventarc posts CloudEvents in binary mode: attributes travel as `ce-*`
//! headers and the body is a `DocumentEventData` in the Firestore REST JSON
//! encoding. Only creations inside the trigger collection reach the relay.

mod handlers;
mod models;

pub use handlers::firestore_document_created;
pub use models::{
    CloudEventHeaders, DocumentEventData, DocumentMask, TriggerResponse, DOCUMENT_CREATED_EVENT,
};
