//! Request error taxonomy.
//!
//! Every failure that crosses the API boundary is one of these kinds. The
//! numeric code is stable for machine consumption; the HTTP status carries
//! the transport semantics. Note the two-tier split between
//! `Unauthenticated` (no actor where one is required) and `Forbidden`
//! (actor resolved but not permitted).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::gateway::types::ApiResponse;

/// Stable error codes (1xxx client, 2xxx auth, 4xxx resource, 5xxx server).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// 1001: Malformed or missing request data
    InvalidParameter = 1001,
    /// 2001: No credential where one is required
    Unauthenticated = 2001,
    /// 2002: Identity key unknown, or token claims mismatch
    InvalidCredential = 2002,
    /// 2003: Actor resolved but lacks ownership/role
    Forbidden = 2003,
    /// 4001: Resource does not exist
    NotFound = 4001,
    /// 4002: Resource already exists
    Conflict = 4002,
    /// 5000: Internal server error
    InternalError = 5000,
}

impl ErrorCode {
    /// Get error code as i32.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get error name string.
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidParameter => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API-visible error with a stable code and a human message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an error with the default message for its code.
    pub fn from_code(code: ErrorCode) -> Self {
        let message = match code {
            ErrorCode::InvalidParameter => "Invalid request parameter",
            ErrorCode::Unauthenticated => "Authentication required",
            ErrorCode::InvalidCredential => "Invalid credential",
            ErrorCode::Forbidden => "Access denied",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::Conflict => "Resource already exists",
            ErrorCode::InternalError => "Internal server error",
        };
        Self::new(code, message)
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        let body = ApiResponse::<()>::error(self.code.code(), self.message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::Unauthenticated.code(), 2001);
        assert_eq!(ErrorCode::InvalidCredential.code(), 2002);
        assert_eq!(ErrorCode::Forbidden.code(), 2003);
        assert_eq!(ErrorCode::NotFound.code(), 4001);
    }

    #[test]
    fn test_error_names() {
        assert_eq!(ErrorCode::Unauthenticated.name(), "UNAUTHENTICATED");
        assert_eq!(ErrorCode::Forbidden.name(), "FORBIDDEN");
    }

    #[test]
    fn test_http_status_two_tier() {
        // 401 for missing/invalid credentials, 403 for denied access
        assert_eq!(
            ErrorCode::Unauthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::InvalidCredential.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::Forbidden.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_from_code() {
        let err = ApiError::from_code(ErrorCode::InvalidCredential);
        assert_eq!(err.code, ErrorCode::InvalidCredential);
        assert!(err.message.contains("Invalid"));
    }
}
