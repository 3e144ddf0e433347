// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session resolution.
//!
//! The engine only exposes sessions through its HTTP session endpoint, and
//! the JSON it serializes there may be filtered by the application's own
//! session callback. To hand routes the full token and adapter user, the
//! resolver wraps the session callback and records the raw bundle the
//! engine passes in, then uses the HTTP response only to decide whether a
//! session exists.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    body::{to_bytes, Body},
    http::{header::COOKIE, request::Parts, HeaderMap, HeaderValue, Method, Request},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use super::engine::AuthEngine;
use super::error::AuthError;
use super::normalize::prepare_auth_request;
use super::options::{set_env_defaults, AuthConfig, SessionCallback};
use crate::config::AuthEnv;

/// Largest session body the resolver will read.
const SESSION_BODY_LIMIT: usize = 64 * 1024;

/// Decoded JWT claims.
pub type Jwt = Map<String, Value>;

/// The public session object served by `GET <basePath>/session`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// Expiry as an ISO 8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user record as stored by the engine's database adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterUser {
    pub id: String,
    pub email: String,
    #[serde(default, rename = "emailVerified")]
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The resolved identity of a request.
///
/// Only produced by [`get_user_from_session`]. `token` is set for the JWT
/// strategy and `user` for the database strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub session: Session,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Jwt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AdapterUser>,
}

impl AuthUser {
    /// A user counts as authenticated when a token or an adapter user is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() || self.user.is_some()
    }
}

/// The bundle an engine passes to the session callback.
pub type SessionParams = AuthUser;

/// Resolve the session attached to a request's cookies.
///
/// Returns `Ok(None)` whenever no session can be established, including
/// engine failures and malformed responses. The only error is a missing
/// configuration, which means the configure stage never ran.
pub async fn get_user_from_session<E>(
    parts: &Parts,
    env: &AuthEnv,
    engine: &E,
) -> Result<Option<AuthUser>, AuthError>
where
    E: AuthEngine + ?Sized,
{
    let Some(config) = parts.extensions.get::<AuthConfig>() else {
        tracing::error!("Session lookup without auth configuration; add the setup_auth layer");
        return Err(AuthError::MissingConfig);
    };
    let mut config = config.clone();
    set_env_defaults(env, &mut config);

    let Some(session_request) = session_request(parts, env, config.base_path()) else {
        return Ok(None);
    };

    let captured: Arc<Mutex<Option<AuthUser>>> = Arc::default();
    config.callbacks.session = Some(capturing_callback(
        Arc::clone(&captured),
        config.callbacks.session.take(),
    ));

    let response = match engine.handle(session_request, config).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed, treating request as unauthenticated");
            return Ok(None);
        }
    };

    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), "Session endpoint returned an error status");
        return Ok(None);
    }

    let bytes = match to_bytes(response.into_body(), SESSION_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session response");
            return Ok(None);
        }
    };

    let session = match serde_json::from_slice::<Option<Session>>(&bytes) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(error = %e, "Session response is not a session object");
            return Ok(None);
        }
    };

    match session {
        Some(session) if session.user.is_some() => {
            let raw = captured
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            Ok(Some(raw.unwrap_or(AuthUser {
                session,
                token: None,
                user: None,
            })))
        }
        _ => Ok(None),
    }
}

/// Build the synthetic `GET <origin><basePath>/session` request.
///
/// Only the inbound `Cookie` header is forwarded.
fn session_request(parts: &Parts, env: &AuthEnv, base_path: &str) -> Option<Request<Body>> {
    let mut probe = Request::new(());
    *probe.method_mut() = parts.method.clone();
    *probe.uri_mut() = parts.uri.clone();
    *probe.version_mut() = parts.version;
    *probe.headers_mut() = parts.headers.clone();

    let normalized = match prepare_auth_request(probe, env.auth_url()) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot normalize request for session lookup");
            return None;
        }
    };
    let origin = Url::parse(&normalized.uri().to_string())
        .ok()?
        .origin()
        .ascii_serialization();

    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(format!("{origin}{base_path}/session"));
    if let Some(cookie) = joined_cookies(&parts.headers) {
        builder = builder.header(COOKIE, cookie);
    }

    match builder.body(Body::empty()) {
        Ok(request) => Some(request),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build session request");
            None
        }
    }
}

/// Every `Cookie` field folded into one value, in arrival order.
///
/// HTTP/2 clients may send one field per cookie.
fn joined_cookies(headers: &HeaderMap) -> Option<HeaderValue> {
    let mut values = headers.get_all(COOKIE).iter();
    let mut joined = values.next()?.as_bytes().to_vec();
    for value in values {
        joined.extend_from_slice(b"; ");
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_bytes(&joined).ok()
}

/// Wrap `original` so the raw session bundle is recorded into `slot`.
///
/// The returned session carries the adapter user (or, failing that, the
/// token) as its `user` unless the session already has one.
fn capturing_callback(
    slot: Arc<Mutex<Option<AuthUser>>>,
    original: Option<SessionCallback>,
) -> SessionCallback {
    Arc::new(move |params: &SessionParams| {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(params.clone());

        let mut session = match &original {
            Some(callback) => callback(params),
            None => params.session.clone(),
        };
        if session.user.is_none() {
            session.user = params
                .user
                .as_ref()
                .and_then(|u| serde_json::to_value(u).ok())
                .or_else(|| params.token.clone().map(Value::Object));
        }
        session
    })
}
