//! Centralized API error handling
//!
//! Maps protocol errors onto HTTP status codes and a JSON error body. Server
//! side failures are logged in full but reported to the client generically.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid Request: Invalid Public Key")]
    InvalidAddress,

    #[error("Invalid Request: Invalid Nonce")]
    InvalidNonce,

    #[error("Invalid Request: Invalid Signature")]
    InvalidSignature,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidAddress => "INVALID_ADDRESS",
            ApiError::InvalidNonce => "INVALID_NONCE",
            ApiError::InvalidSignature => "INVALID_SIGNATURE",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::StorageError(_) => "STORAGE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidAddress | ApiError::InvalidNonce | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidSignature | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::StorageError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Status for the query-string endpoints, which answer every client
    /// mistake with 400
    pub fn legacy_status_code(&self) -> StatusCode {
        if self.is_server_error() {
            self.status_code()
        } else {
            StatusCode::BAD_REQUEST
        }
    }

    fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    pub fn log(&self) {
        if self.is_server_error() {
            tracing::error!(error = %self, code = %self.error_code(), "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = %self.error_code(), "Client error occurred");
        }
    }

    /// Message safe to show the caller
    pub fn public_message(&self) -> String {
        match self {
            ApiError::StorageError(_) => "Storage temporarily unavailable".to_string(),
            ApiError::InternalError(_) => "Internal server error".to_string(),
            ApiError::ServiceUnavailable(_) => "Service unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.log();

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message: self.public_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidAddress => ApiError::InvalidAddress,
            AuthError::InvalidNonce => ApiError::InvalidNonce,
            AuthError::InvalidSignature => ApiError::InvalidSignature,
            AuthError::Storage(msg) => ApiError::StorageError(msg),
            AuthError::Token(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;
