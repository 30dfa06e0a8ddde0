mod api;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::relay::RelayError;

pub use api::GoogleApiError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl AppError {
    fn redacted(log_msg: &str, public_msg: &str) -> String {
        if is_production() {
            public_msg.to_string()
        } else {
            log_msg.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let log_message = self.to_string();
        let (status, code, client_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            // 503 tells the event delivery platform the failure is worth retrying
            AppError::Relay(e) if e.is_transient() => (
                StatusCode::SERVICE_UNAVAILABLE,
                e.code(),
                Self::redacted(&log_message, "Service temporarily unavailable"),
            ),
            AppError::Relay(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                e.code(),
                Self::redacted(&log_message, "Failed to relay notification"),
            ),
        };

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "Request failed"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::StoreError;
    use crate::push::PushError;
    use crate::relay::RelayError;

    fn rejected(status: u16, code: &str) -> PushError {
        PushError::Rejected {
            status,
            code: code.to_string(),
            message: "rejected".to_string(),
        }
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::Validation("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unsupported_media_type_maps_to_415() {
        let response = AppError::UnsupportedMediaType("protobuf".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_transient_relay_error_maps_to_503() {
        let error = AppError::from(RelayError::Delivery(rejected(503, "UNAVAILABLE")));
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let error = AppError::from(RelayError::Lookup(StoreError::Api {
            status: 500,
            code: "INTERNAL".to_string(),
            message: "boom".to_string(),
        }));
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_permanent_relay_error_maps_to_500() {
        let error = AppError::from(RelayError::Delivery(rejected(404, "UNREGISTERED")));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = AppError::from(RelayError::Cleanup(StoreError::InvalidPath("x".to_string())));
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
