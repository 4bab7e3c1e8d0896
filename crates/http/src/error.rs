//! Error handling for the alexandria HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use alexandria_catalog::CatalogError;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String, code: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code: "unauthorized".to_string(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            code: "forbidden".to_string(),
        }
    }
}

/// Catalog results carry their own taxonomy; translate it to wire statuses.
/// Validation problems are user-correctable, hence 400 rather than 500.
impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Validation(message) => AppError::bad_request(message),
            CatalogError::NotFound(kind) => AppError::not_found(format!("{kind} not found")),
            CatalogError::Forbidden => AppError::forbidden("Not allowed"),
            CatalogError::Repository(source) => AppError::Internal(source),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();

        let (status, error_code, message) = match self {
            AppError::BadRequest { message, code } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NotFound { message, code } => (StatusCode::NOT_FOUND, code, message),
            AppError::Unauthorized { message, code } => {
                (StatusCode::UNAUTHORIZED, code, message)
            }
            AppError::Forbidden { message, code } => (StatusCode::FORBIDDEN, code, message),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error".to_string(),
                e.to_string(),
            ),
        };

        tracing::error!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            "Request error"
        );

        // In production, we might want to hide internal error details
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message,
                "trace_id": error_id.to_string(),
                "timestamp": timestamp
            }
        });

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_response_mapping() {
        let error = AppError::not_found("Resource not found");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_mapping() {
        let internal_error = anyhow::anyhow!("storage offline");
        let error = AppError::Internal(internal_error);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn catalog_errors_translate_to_wire_statuses() {
        let cases = [
            (
                CatalogError::validation("Title is required"),
                StatusCode::BAD_REQUEST,
            ),
            (CatalogError::NotFound("Book"), StatusCode::NOT_FOUND),
            (CatalogError::Forbidden, StatusCode::FORBIDDEN),
            (
                CatalogError::Repository(anyhow::anyhow!("storage offline")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (catalog_error, expected) in cases {
            let response = AppError::from(catalog_error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn not_found_translation_keeps_the_message() {
        let error = AppError::from(CatalogError::NotFound("Book"));
        match error {
            AppError::NotFound { message, .. } => assert_eq!(message, "Book not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
