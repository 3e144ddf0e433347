// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::engine::EngineError;
use super::normalize::NormalizeError;

/// Errors produced by the auth stages.
///
/// Rendered as `text/plain` responses whose bodies are exactly the
/// `Display` output, so `Unauthorized` and `MissingSecret` yield the
/// literal bodies `Unauthorized` and `Missing AUTH_SECRET`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session with a token or user was found
    #[error("Unauthorized")]
    Unauthorized,

    /// The attached configuration has no secret
    #[error("Missing AUTH_SECRET")]
    MissingSecret,

    /// No configuration was attached to the request (configure stage missing)
    #[error("Missing auth configuration")]
    MissingConfig,

    /// The request URL could not be normalized
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The engine call failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::MissingSecret | AuthError::MissingConfig | AuthError::Normalize(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::Engine(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Engine(e) => e.into_response(),
            other => (other.status_code(), other.to_string()).into_response(),
        }
    }
}
