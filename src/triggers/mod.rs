mod firestore;

pub use firestore::{
    firestore_document_created, CloudEventHeaders, DocumentEventData, DocumentMask,
    TriggerResponse, DOCUMENT_CREATED_EVENT,
};
