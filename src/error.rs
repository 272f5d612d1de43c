// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::domain::policy::Denied;
use crate::domain::rules::DomainError;

/// HTTP API error with appropriate status codes and client-facing messages.
/// Bodies are always JSON with a `message` field; 500s carry the raw error
/// string in a debug `error` field the way legacy clients expect.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request - validation failures and domain conflicts
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden - role/ownership denial
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (email-exists)
    Conflict(String),

    // 500 Internal Server Error - detail logged, generic message returned
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message; internal detail never leaks here.
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Internal(_) => "Lỗi server",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Internal(detail) => json!({
                "message": self.message(),
                "error": detail,
            }),
            _ => json!({ "message": self.message() }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

/// Domain-rule violations are detected before any mutation and are 400s
/// by convention of this system.
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<Denied> for ApiError {
    fn from(err: Denied) -> Self {
        ApiError::Forbidden(err.0)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        tracing::error!("database manager error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("bcrypt error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("jwt error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

/// Handler result: success payload or a structured `ApiError` response.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_become_400_with_verbatim_message() {
        let err: ApiError = DomainError::TermTooShort.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Thời hạn hợp đồng phải ít nhất 30 ngày");
    }

    #[test]
    fn denials_become_403() {
        let err: ApiError = Denied("Chỉ admin mới có quyền duyệt bài".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_errors_hide_detail_in_message_but_expose_debug_field() {
        let err = ApiError::internal("connection refused");
        assert_eq!(err.message(), "Lỗi server");
        let body = err.to_json();
        assert_eq!(body["message"], "Lỗi server");
        assert_eq!(body["error"], "connection refused");
    }
}
