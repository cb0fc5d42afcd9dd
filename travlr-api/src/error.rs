use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use travlr_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError { message: String, errors: BTreeMap<String, String> },
    NotFoundError(String),
    ConflictError { message: String, field: Option<String> },
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, json!({ "message": msg })),
            AppError::ValidationError { message, errors } => {
                let body = if errors.is_empty() {
                    json!({ "message": message })
                } else {
                    json!({ "message": message, "errors": errors })
                };
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::ConflictError { message, field } => {
                let body = match field {
                    Some(field) => json!({ "message": message, "field": field }),
                    None => json!({ "message": message }),
                };
                (StatusCode::CONFLICT, body)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(errors) => AppError::ValidationError {
                message: "Validation Error".to_string(),
                errors,
            },
            CoreError::Unauthorized(msg) => AppError::AuthenticationError(msg),
            CoreError::Conflict { message, field } => AppError::ConflictError { message, field },
            CoreError::NotFound(msg) => AppError::NotFoundError(msg),
            CoreError::InternalError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError {
            message: rejection.body_text(),
            errors: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_core_errors_map_to_status_codes() {
        let (status, body) = render(CoreError::invalid_field("rating", "Rating must be between 1 and 5.").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["rating"], "Rating must be between 1 and 5.");

        let (status, body) = render(CoreError::conflict_on("code", "Duplicate trip code.").into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["field"], "code");

        let (status, _) = render(CoreError::Unauthorized("Invalid credentials".into()).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = render(CoreError::NotFound("Trip not found with code XYZ".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Trip not found with code XYZ");
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_exposed() {
        let (status, body) = render(CoreError::InternalError("connection refused to 10.0.0.5".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal Server Error" }));
    }
}
