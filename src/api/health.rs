//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub project_id: String,
    pub store_backend: String,
    pub push_gateway: String,
    pub trigger_collection: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        project_id: state.settings.firebase.project_id.clone(),
        store_backend: state.relay.store_backend().to_string(),
        push_gateway: state.relay.push_gateway().to_string(),
        trigger_collection: state.settings.firestore.trigger_collection.clone(),
    })
}
