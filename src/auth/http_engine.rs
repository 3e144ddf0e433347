// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! An [`AuthEngine`] backed by an auth service reachable over HTTP.
//!
//! Requests are forwarded to the service with their path and query intact,
//! and the public origin is passed along in `x-forwarded-*` headers. The
//! service cannot call back into this process, so the session callback is
//! applied here, on the session JSON the service returns. The session's
//! `user` object stands in for the token or adapter user the service keeps.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{
        header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING},
        HeaderMap, Method,
    },
    response::Response,
};
use serde_json::Value;
use url::Url;

use super::engine::{AuthEngine, EngineError};
use super::normalize::{X_FORWARDED_HOST, X_FORWARDED_PROTO};
use super::options::{AuthConfig, SessionStrategy};
use super::session::{AdapterUser, Session, SessionParams};

/// Transport timeout for calls to the auth service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest request or response body forwarded.
const BODY_LIMIT: usize = 1024 * 1024;

/// HTTP client for an external auth engine.
#[derive(Clone)]
pub struct HttpEngine {
    /// Base URL of the auth service
    endpoint: Url,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpEngine {
    /// Create a client for the service at `endpoint`.
    pub fn new(endpoint: Url) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        Ok(Self { endpoint, client })
    }

    /// Get the service endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The service URL for a request: the endpoint with the request's path and query.
    fn target_url(&self, public: &Url) -> Url {
        let mut target = self.endpoint.clone();
        let base = self.endpoint.path().trim_end_matches('/');
        target.set_path(&format!("{base}{}", public.path()));
        target.set_query(public.query());
        target
    }
}

impl AuthEngine for HttpEngine {
    async fn handle(&self, request: Request, config: AuthConfig) -> Result<Response, EngineError> {
        let (parts, body) = request.into_parts();
        let public = Url::parse(&parts.uri.to_string())
            .map_err(|e| EngineError::Transport(format!("request URL: {e}")))?;
        let target = self.target_url(&public);
        let body = to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        tracing::debug!(method = %parts.method, target = %target, "Forwarding to auth service");

        let upstream = self
            .client
            .request(parts.method.clone(), target)
            .headers(forwarded_headers(&parts.headers, &public))
            .body(body)
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let is_session_lookup = parts.method == Method::GET
            && public.path() == format!("{}/session", config.base_path());
        let bytes = if is_session_lookup && status.is_success() {
            match decorate_session(&bytes, &config) {
                Some(decorated) => {
                    headers.remove(CONTENT_LENGTH);
                    decorated
                }
                None => bytes.to_vec(),
            }
        } else {
            bytes.to_vec()
        };

        headers.remove(TRANSFER_ENCODING);
        headers.remove(CONNECTION);

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Headers sent to the auth service.
///
/// Drops `host` and hop-by-hop headers and describes the public origin with
/// `x-forwarded-host` / `x-forwarded-proto`.
fn forwarded_headers(inbound: &HeaderMap, public: &Url) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in [HOST, CONTENT_LENGTH, TRANSFER_ENCODING, CONNECTION] {
        headers.remove(name);
    }

    let host = match (public.host_str(), public.port()) {
        (Some(host), Some(port)) => Some(format!("{host}:{port}")),
        (Some(host), None) => Some(host.to_owned()),
        _ => None,
    };
    if let Some(value) = host.and_then(|h| h.parse().ok()) {
        headers.insert(X_FORWARDED_HOST, value);
    }
    if let Ok(value) = public.scheme().parse() {
        headers.insert(X_FORWARDED_PROTO, value);
    }
    headers
}

/// Run the session callback over a session response body.
///
/// Returns `None` when there is no callback, the body is not a session, or
/// the session has no user object; the body is then passed through untouched.
fn decorate_session(body: &[u8], config: &AuthConfig) -> Option<Vec<u8>> {
    let callback = config.callbacks.session.as_ref()?;
    let session = serde_json::from_slice::<Option<Session>>(body).ok()??;
    let params = session_params(session, config.session.strategy)?;
    serde_json::to_vec(&callback(&params)).ok()
}

/// Rebuild the callback bundle from a public session.
///
/// The service keeps the raw token (or database user) to itself, so the
/// session's `user` object stands in for it: as the token under the `jwt`
/// strategy, as the adapter user under `database` when it has the adapter
/// user's shape.
fn session_params(session: Session, strategy: SessionStrategy) -> Option<SessionParams> {
    let Some(Value::Object(fields)) = session.user.clone() else {
        return None;
    };
    let (token, user) = match strategy {
        SessionStrategy::Jwt => (Some(fields), None),
        SessionStrategy::Database => (
            None,
            serde_json::from_value::<AdapterUser>(Value::Object(fields)).ok(),
        ),
    };
    Some(SessionParams {
        session,
        token,
        user,
    })
}
