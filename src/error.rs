//! API Error Taxonomy
//! Mission: one error surface for every handler, rendered as `{"error": msg}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Every failure a handler can produce. Components return these directly so
/// the HTTP layer never has to guess a status code.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input (400).
    Validation(String),
    /// Referenced entity does not exist (404).
    NotFound(String),
    /// Missing, invalid, or expired credential (401).
    Auth(String),
    /// Duplicate value for a unique field (409).
    Conflict(String),
    /// Unexpected store or signing failure (500). Details are logged, not
    /// leaked to the client.
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Map a store failure: UNIQUE-constraint violations become `Conflict`
    /// with the given message, anything else stays `Internal`.
    pub fn conflict_or_internal(err: anyhow::Error, conflict_msg: &str) -> Self {
        if crate::store::is_unique_violation(&err) {
            Self::Conflict(conflict_msg.to_string())
        } else {
            Self::Internal(err)
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::validation("bad"), StatusCode::BAD_REQUEST),
            (ApiError::not_found("gone"), StatusCode::NOT_FOUND),
            (ApiError::auth("denied"), StatusCode::UNAUTHORIZED),
            (ApiError::conflict("dup"), StatusCode::CONFLICT),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = ApiError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: ApiError = anyhow::anyhow!("db gone").into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
