use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Failures reported by a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to decode store response: {0}")]
    Decode(String),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl StoreError {
    /// Transport failures, rate limiting and server-side errors may succeed on retry
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Http(_) => true,
            StoreError::Api { status, .. } => *status == 429 || *status >= 500,
            StoreError::Database(_)
            | StoreError::Decode(_)
            | StoreError::InvalidIdentifier(_)
            | StoreError::InvalidQuery(_) => false,
        }
    }
}

/// Errors surfaced by the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Error in bulk update: {0}")]
    BulkUpdate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, (*message).to_string()),
            ApiError::InvalidRequest(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            ApiError::BulkUpdate(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ApiError::Store(e) => {
                error!(error = %e, "Store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_store_errors() {
        let server_error = StoreError::Api {
            status: 503,
            body: "unavailable".to_string(),
        };
        let rate_limited = StoreError::Api {
            status: 429,
            body: String::new(),
        };
        let bad_request = StoreError::Api {
            status: 400,
            body: "bad filter".to_string(),
        };

        assert!(server_error.is_transient());
        assert!(rate_limited.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!StoreError::Decode("oops".to_string()).is_transient());
        assert!(!StoreError::InvalidIdentifier("a b".to_string()).is_transient());
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Api {
            status: 401,
            body: "Invalid API key".to_string(),
        };
        assert_eq!(err.to_string(), "store API error (401): Invalid API key");
    }

    #[test]
    fn test_not_found_status() {
        let response = ApiError::NotFound("Localization not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_request_status() {
        let response =
            ApiError::InvalidRequest("missing field `project_ids`".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_bulk_update_error_message() {
        let err = ApiError::BulkUpdate("missing field `updates`".to_string());
        assert_eq!(err.to_string(), "Error in bulk update: missing field `updates`");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_hides_details() {
        let response = ApiError::from(StoreError::Decode("secret".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
