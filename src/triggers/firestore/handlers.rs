use axum::{body::Bytes, extract::State, http::header, http::HeaderMap, Json};
use uuid::Uuid;

use super::models::{CloudEventHeaders, DocumentEventData, TriggerResponse};
use crate::error::{AppError, Result};
use crate::firestore::DocumentPath;
use crate::relay::TriggerEvent;
use crate::server::AppState;

/// Handle a Firestore document-created CloudEvent
///
/// Events outside the trigger collection, non-creation events and events
/// without a document snapshot are acknowledged without touching the relay.
#[tracing::instrument(
    name = "trigger.firestore",
    skip(state, headers, body),
    fields(event_id = tracing::field::Empty, document = tracing::field::Empty)
)]
pub async fn firestore_document_created(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TriggerResponse>> {
    let ce = CloudEventHeaders::from_headers(&headers);
    let event_id = ce
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    tracing::Span::current().record("event_id", event_id.as_str());

    if !ce.is_document_created() {
        tracing::debug!(event_type = ?ce.event_type, "Skipping non-creation event");
        return Ok(Json(TriggerResponse::skipped(
            event_id,
            format!(
                "event type '{}' is not handled",
                ce.event_type.as_deref().unwrap_or_default()
            ),
        )));
    }

    if is_protobuf(&headers) {
        return Err(AppError::UnsupportedMediaType(
            "Firestore events must be delivered as application/json".to_string(),
        ));
    }

    let data: DocumentEventData = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid Firestore event payload: {}", e)))?;

    let Some(document) = data.value else {
        return Ok(Json(TriggerResponse::skipped(
            event_id,
            "event carries no document snapshot",
        )));
    };

    let path = DocumentPath::from_resource_name(&document.name).or_else(|| {
        ce.subject
            .as_deref()
            .and_then(DocumentPath::from_resource_name)
    });
    let Some(path) = path else {
        tracing::debug!(name = %document.name, "Skipping document outside a top-level collection");
        return Ok(Json(TriggerResponse::skipped(
            event_id,
            format!("document '{}' is not in a watched collection", document.name),
        )));
    };
    tracing::Span::current().record("document", tracing::field::display(&path));

    let trigger_collection = &state.settings.firestore.trigger_collection;
    if &path.collection != trigger_collection {
        tracing::debug!(collection = %path.collection, "Skipping document outside trigger collection");
        return Ok(Json(TriggerResponse::skipped(
            event_id,
            format!("collection '{}' is not watched", path.collection),
        )));
    }

    let mut event = TriggerEvent::new(path, document);
    if let Some(time) = ce.time {
        event = event.with_event_time(time);
    }

    let outcome = state.relay.handle(event).await?;

    Ok(Json(TriggerResponse::handled(event_id, outcome)))
}

fn is_protobuf(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("protobuf"))
        .unwrap_or(false)
}
