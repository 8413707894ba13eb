//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database error.
    #[error("{0}")]
    Database(#[from] DatabaseError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(DatabaseError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Database(DatabaseError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            ApiError::Database(
                DatabaseError::Validation(_) | DatabaseError::InvalidReference(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Database error: {}", self);
        } else {
            tracing::debug!(status = %status, "Request rejected: {}", self);
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database::ValidationError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(DatabaseError::NotFound {
            entity: "Tracker",
            id: "7".to_string(),
        });
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let exists = ApiError::from(DatabaseError::AlreadyExists {
            entity: "Rack",
            id: "A12".to_string(),
        });
        assert_eq!(exists.into_response().status(), StatusCode::CONFLICT);

        let invalid = ApiError::from(DatabaseError::Validation(ValidationError::Empty(
            "rack".to_string(),
        )));
        assert_eq!(
            invalid.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let reference = ApiError::from(DatabaseError::InvalidReference(
            "service type 99".to_string(),
        ));
        assert_eq!(
            reference.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
