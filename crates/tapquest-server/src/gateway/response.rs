use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use tapquest_core::Error;

/// HTTP-facing error: a status code and the message sent to the caller.
///
/// Wire shape is `{"error": "..."}`. Internal failures are logged
/// server-side and flattened to a generic message before they reach here.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Operation failed".to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(message) | Error::InvalidArgument(message) => {
                Self::bad_request(message)
            }
            Error::Unauthorized(message) | Error::Forbidden(message) => Self::forbidden(message),
            Error::NotFound(message) => Self::not_found(message),
            other => {
                tracing::error!(error = %other, "Request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Handler result type using [`ApiError`].
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let api: ApiError = Error::Validation("bad rewards".to_string()).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "bad rewards");

        let api: ApiError = Error::Forbidden("nope".to_string()).into();
        assert_eq!(api.status, StatusCode::FORBIDDEN);

        let api: ApiError = Error::NotFound("gone".to_string()).into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let api: ApiError = Error::Database("secret connection string".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Operation failed");
    }
}
