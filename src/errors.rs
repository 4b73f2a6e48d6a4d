use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// Every variant is terminal for the request that produced it; nothing here
/// is retried or downgraded to a partial success.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Bad request error (malformed or out-of-range input).
    BadRequest(String),
    /// A required provider credential or setting is unavailable.
    ConfigurationError(String),
    /// An upstream provider was unreachable or returned a non-success status.
    UpstreamError(String),
    /// An upstream provider call exceeded its timeout.
    UpstreamTimeout(String),
    /// An upstream provider returned content that could not be parsed.
    UpstreamFormat(String),
    /// Provider content parsed but does not match the required schema.
    ///
    /// Carries the collected violations and the raw payload so callers can
    /// diagnose what the provider actually produced.
    Validation {
        errors: Vec<String>,
        raw: serde_json::Value,
    },
    /// An assembled response failed its own schema check.
    InternalValidation(Vec<String>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
            AppError::UpstreamTimeout(msg) => write!(f, "Upstream timeout: {}", msg),
            AppError::UpstreamFormat(msg) => write!(f, "Upstream format error: {}", msg),
            AppError::Validation { errors, .. } => {
                write!(f, "Validation error: {}", errors.join("; "))
            }
            AppError::InternalValidation(errors) => {
                write!(f, "Internal validation error: {}", errors.join("; "))
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::ConfigurationError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::UpstreamTimeout(msg) => {
                tracing::error!("Upstream timeout: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::UpstreamFormat(msg) => {
                tracing::error!("Upstream format error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::Validation { errors, raw } => {
                tracing::error!("Validation error: {:?}", errors);
                tracing::error!("Raw response: {}", raw);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Invalid response structure from model provider",
                        "validation_errors": errors,
                        "raw_response": raw,
                    }),
                )
            }
            AppError::InternalValidation(errors) => {
                tracing::error!("Assembled response failed validation: {:?}", errors);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Invalid response structure",
                        "validation_errors": errors,
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    ///
    /// Timed-out calls are distinguished from other transport failures.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout(err.to_string())
        } else {
            AppError::UpstreamError(err.to_string())
        }
    }
}
