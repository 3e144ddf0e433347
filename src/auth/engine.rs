// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authentication engine seam.
//!
//! The engine owns the sign-in, sign-out and session protocol. This crate
//! only prepares its input and routes its output; everything behind
//! [`AuthEngine::handle`] is opaque.

use std::future::Future;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::options::AuthConfig;

/// An authentication engine.
///
/// Given a request under the configured base path and the configuration,
/// the engine produces the full HTTP response (redirects, cookies, JSON).
///
/// ## Session callback contract
///
/// When answering `GET <basePath>/session` for a live session, the engine
/// must call `config.callbacks.session` (if set) synchronously with the raw
/// session bundle, and serialize whatever the callback returns. The
/// session resolver relies on this to observe the token and adapter user
/// that the public session JSON may omit.
pub trait AuthEngine: Send + Sync + 'static {
    fn handle(
        &self,
        request: Request,
        config: AuthConfig,
    ) -> impl Future<Output = Result<Response, EngineError>> + Send;
}

/// Failures raised by an engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("auth engine request failed: {0}")]
    Transport(String),

    #[error("auth engine returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("auth engine rejected the configuration: {0}")]
    Configuration(String),
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, self.to_string()).into_response()
    }
}
