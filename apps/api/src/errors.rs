use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Malformed model output never reaches this type: the normalizer absorbs it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                match e {
                    LlmError::Unavailable(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "MODEL_UNAVAILABLE",
                        "The language model service could not be reached".to_string(),
                    ),
                    LlmError::Timeout(_) => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "MODEL_TIMEOUT",
                        "The language model service timed out".to_string(),
                    ),
                    _ => (
                        StatusCode::BAD_GATEWAY,
                        "MODEL_ERROR",
                        "The language model service returned an error".to_string(),
                    ),
                }
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred while generating job descriptions".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": code
        }));

        (status, body).into_response()
    }
}

/// Body decode failures (bad JSON, wrong field types, missing fields) share the
/// error envelope instead of axum's plain-text rejection.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::UnprocessableEntity(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        assert_eq!(
            status_of(AppError::Validation("Designation cannot be empty".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_llm_errors_map_to_gateway_statuses() {
        assert_eq!(
            status_of(LlmError::Unavailable("refused".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(LlmError::Timeout(Duration::from_secs(1)).into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(LlmError::EmptyContent.into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_maps_to_500() {
        assert_eq!(
            status_of(AppError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unprocessable_entity_maps_to_422() {
        assert_eq!(
            status_of(AppError::UnprocessableEntity("missing field `yoe`".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
