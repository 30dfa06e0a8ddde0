use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;
use crate::triggers::firestore_document_created;

use super::health::health;
use super::metrics::prometheus_metrics;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Eventarc delivers to the service root by default
        .route("/", post(firestore_document_created))
        .route("/triggers/firestore", post(firestore_document_created))
}
