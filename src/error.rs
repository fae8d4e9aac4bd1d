//! Caller-visible error taxonomy.
//!
//! Every variant renders as a plain-text body with a fixed message. Internal
//! faults carry their detail for logging only; the body is always the same
//! generic text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::security::signature::SignatureError;
use crate::store::StoreError;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Bots Not Allowed")]
    BotRejected,

    #[error("Invalid Origin")]
    OriginRejected,

    #[error("Too Many Requests")]
    RateLimited,

    /// Route-specific validation failure.
    #[error("{0}")]
    MalformedRequest(&'static str),

    #[error("Missing Signature")]
    SignatureMissing,

    #[error("{0}")]
    Signature(#[from] SignatureError),

    #[error("{0}")]
    NotFound(&'static str),

    /// Anything unexpected. The detail is logged, never returned.
    #[error("Internal Error")]
    Internal(String),
}

/// Result type for request handling.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BotRejected
            | ApiError::OriginRejected
            | ApiError::SignatureMissing
            | ApiError::Signature(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed => "method",
            ApiError::BotRejected => "bot",
            ApiError::OriginRejected => "origin",
            ApiError::RateLimited => "rate_limit",
            ApiError::MalformedRequest(_) => "malformed",
            ApiError::SignatureMissing => "signature_missing",
            ApiError::Signature(SignatureError::InvalidTimestamp) => "signature_timestamp",
            ApiError::Signature(SignatureError::Expired) => "signature_expired",
            ApiError::Signature(SignatureError::Mismatch) => "signature_invalid",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }
        (self.status_code(), self.to_string()).into_response()
    }
}
