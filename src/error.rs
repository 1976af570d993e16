// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::models::Violation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired session token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Plan failed validation; carries every violated invariant so the UI
    /// can report all problems at once.
    #[error("Plan invalid: {} violation(s)", .0.len())]
    PlanInvalid(Vec<Violation>),

    /// Converter input error (e.g. missing or zero threshold pace).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// OAuth exchange or refresh failed; the user must re-authorize.
    #[error("OAuth error: {0}")]
    Auth(String),

    /// The Wahoo API rejected a request; the remote body is kept verbatim.
    #[error("Wahoo API error: HTTP {status}: {body}")]
    WahooApi { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut violations = None;

        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::PlanInvalid(list) => {
                violations = Some(list.iter().map(|v| v.to_string()).collect());
                (StatusCode::UNPROCESSABLE_ENTITY, "plan_invalid", None)
            }
            AppError::InvalidConfiguration(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_configuration",
                Some(msg.clone()),
            ),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, "auth_error", Some(msg.clone())),
            AppError::WahooApi { status, body } => (
                StatusCode::BAD_GATEWAY,
                "wahoo_error",
                Some(format!("HTTP {}: {}", status, body)),
            ),
            AppError::Network(msg) => (StatusCode::BAD_GATEWAY, "network_error", Some(msg.clone())),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "timeout", Some(msg.clone())),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            violations,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
