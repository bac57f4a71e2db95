// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Errors fall into three groups: validation errors raised before any
//! network call, errors reported by the hosted backend (surfaced with the
//! backend's own message), and unexpected failures that get mapped to a
//! generic "Failed to ..." message at the store boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No user logged in")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Message reported by the hosted backend, passed through verbatim.
    #[error("{0}")]
    Backend(String),

    /// Auth request refused because of what the user entered, e.g. wrong
    /// password or an email that is already registered.
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Generic "Failed to ..." message for failures the user can only retry.
    #[error("{0}")]
    Failed(&'static str),

    #[error(transparent)]
    Duration(#[from] crate::models::DurationError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Replace an unexpected failure with a generic user-facing message.
    ///
    /// Validation and backend errors keep their own text; anything else
    /// (transport failures, undecodable responses) becomes `Failed(message)`.
    pub fn or_generic(self, message: &'static str) -> Self {
        match self {
            AppError::Network(_) | AppError::Internal(_) | AppError::Duration(_) => {
                tracing::warn!(error = %self, "Mapping unexpected failure to generic message");
                AppError::Failed(message)
            }
            other => other,
        }
    }

    /// True for errors caught before the backend was contacted.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(first_validation_message(&errors))
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Pick the first human-readable message out of a validator error set.
fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                Some(self.to_string()),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Duration(err) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(err.to_string()),
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", Some(self.to_string())),
            AppError::Backend(msg) => (StatusCode::BAD_GATEWAY, "backend_error", Some(msg.clone())),
            AppError::Rejected(msg) => (StatusCode::BAD_REQUEST, "auth_rejected", Some(msg.clone())),
            AppError::Failed(msg) => {
                (StatusCode::BAD_GATEWAY, "request_failed", Some(msg.to_string()))
            }
            AppError::Network(msg) => {
                tracing::error!(error = %msg, "Network error");
                (StatusCode::BAD_GATEWAY, "network_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for stores and handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_generic_maps_network_errors() {
        let err = AppError::Network("connection reset".to_string()).or_generic("Failed to load activities");
        assert_eq!(err.to_string(), "Failed to load activities");
    }

    #[test]
    fn test_or_generic_keeps_backend_message() {
        let err = AppError::Backend("Invalid login credentials".to_string())
            .or_generic("Failed to sign in");
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn test_or_generic_keeps_rejection() {
        let err = AppError::Rejected("Invalid login credentials".to_string())
            .or_generic("Failed to sign in");
        assert!(matches!(err, AppError::Rejected(_)));
    }

    #[test]
    fn test_unauthorized_message() {
        assert_eq!(AppError::Unauthorized.to_string(), "No user logged in");
    }
}
