use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::criteria::SchemaValidationError;
use crate::store::StoreError;

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub surveys: usize,
    pub responses: usize,
}

/// Custom error type for API endpoints
///
/// This error type provides consistent error handling across all endpoints,
/// automatically mapping different error types to appropriate HTTP status codes
/// and formatting them as JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// Invalid UUID format in path parameter
    InvalidUuid(String),
    /// Response not found
    ResponseNotFound(Uuid),
    /// Survey not found
    SurveyNotFound(Uuid),
    /// Note not found on the response
    NoteNotFound(Uuid),
    /// Response data does not fit the survey
    InvalidResponse(String),
    /// Filter criteria failed schema validation
    InvalidCriteria(SchemaValidationError),
    /// Invalid query parameter
    InvalidQueryParam(String),
    /// Request body is not JSON or does not fit the expected shape
    InvalidBody(JsonRejection),
    /// Unexpected failure
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidUuid(id) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid UUID format: expected format like '550e8400-e29b-41d4-a716-446655440000', got '{}'", id),
            ),
            ApiError::ResponseNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Response not found: {}", id),
            ),
            ApiError::SurveyNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Survey not found: {}", id),
            ),
            ApiError::NoteNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Note not found: {}", id),
            ),
            ApiError::InvalidResponse(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Invalid response: {}", msg),
            ),
            ApiError::InvalidCriteria(err) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid filter criteria: {}", err),
            ),
            ApiError::InvalidQueryParam(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid query parameter: {}", msg),
            ),
            ApiError::InvalidBody(rejection) => (
                rejection.status(),
                format!("Invalid request body: {}", rejection.body_text()),
            ),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal error: {}", err),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StoreError>() {
            Ok(store_err) => store_err.into(),
            Err(err) => ApiError::Internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl From<SchemaValidationError> for ApiError {
    fn from(err: SchemaValidationError) -> Self {
        ApiError::InvalidCriteria(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SurveyNotFound(id) => ApiError::SurveyNotFound(id),
            StoreError::ResponseNotFound(id) => ApiError::ResponseNotFound(id),
            StoreError::NoteNotFound(id) => ApiError::NoteNotFound(id),
            err @ StoreError::UnknownQuestion { .. } => ApiError::InvalidResponse(err.to_string()),
        }
    }
}

/// Parse a UUID path segment
pub fn parse_uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidUuid(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_of(ApiError::InvalidUuid("x".to_string())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::ResponseNotFound(Uuid::nil())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ApiError::InvalidResponse("bad".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ApiError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_through_anyhow() {
        let id = Uuid::new_v4();
        let err: ApiError = anyhow::Error::from(StoreError::SurveyNotFound(id)).into();
        assert!(matches!(err, ApiError::SurveyNotFound(found) if found == id));

        let err: ApiError = anyhow::anyhow!("worker panicked").into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(matches!(parse_uuid("nope"), Err(ApiError::InvalidUuid(raw)) if raw == "nope"));
    }
}
