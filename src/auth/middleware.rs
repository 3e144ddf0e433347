// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The three auth stages as Axum middleware and handlers.
//!
//! ```text
//! setup_auth      attach AuthConfig             (never fails)
//!     ↓
//! require_auth    resolve session               → 401 "Unauthorized"
//!     ↓
//! handle_auth_routes  delegate to the engine    → 500 "Missing AUTH_SECRET"
//! ```
//!
//! A stage that returns a response ends the chain; a stage that calls
//! `next.run` lets it continue. `require_auth` and `handle_auth_routes` are
//! independent and both need `setup_auth` to have run first.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let state = AuthState::new(engine, AuthEnv::from_env());
//!
//! let protected = Router::new()
//!     .route("/api/protected", get(protected))
//!     .route_layer(from_fn_with_state(state.clone(), require_auth::<MyEngine>));
//!
//! let app = Router::new()
//!     .route("/api/auth/{*rest}", any(handle_auth_routes::<MyEngine>))
//!     .with_state(state)
//!     .merge(protected)
//!     .layer(from_fn_with_state(create_config(options), setup_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::builder::ConfigHandler;
use super::engine::AuthEngine;
use super::error::AuthError;
use super::normalize::prepare_auth_request;
use super::options::{set_env_defaults, AuthConfig};
use super::session::get_user_from_session;
use crate::config::AuthEnv;
use crate::state::AuthState;

/// Configure stage: attach the handler's configuration to the request.
///
/// Running it twice replaces the earlier configuration.
pub async fn setup_auth(
    State(handler): State<ConfigHandler>,
    mut request: Request,
    next: Next,
) -> Response {
    let config = handler(&request);
    request.extensions_mut().insert(config);
    next.run(request).await
}

/// Require stage: continue only for requests with a resolved session.
///
/// On success the [`AuthUser`](super::AuthUser) is attached to the request
/// extensions. The attached configuration is updated with the environment
/// defaults so later stages see the same values the resolver used.
pub async fn require_auth<E: AuthEngine>(
    State(state): State<AuthState<E>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    if let Some(config) = parts.extensions.get_mut::<AuthConfig>() {
        set_env_defaults(&state.env, config);
    }

    let user = match get_user_from_session(&parts, &state.env, state.engine.as_ref()).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    match user.filter(|u| u.is_authenticated()) {
        Some(user) => {
            parts.extensions.insert(user);
            next.run(Request::from_parts(parts, body)).await
        }
        None => {
            tracing::debug!(path = %parts.uri.path(), "Rejecting request without a session");
            AuthError::Unauthorized.into_response()
        }
    }
}

/// Handle stage: serve the auth routes through the engine.
pub async fn handle_auth_routes<E: AuthEngine>(
    State(state): State<AuthState<E>>,
    request: Request,
) -> Response {
    match handle_auth_request(request, &state.env, state.engine.as_ref()).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Framework-free form of [`handle_auth_routes`].
///
/// Fails with [`AuthError::MissingSecret`] before the engine is called when
/// the attached configuration has no secret. Engine errors are returned
/// unchanged; the engine's response is returned as-is.
pub async fn handle_auth_request<E>(
    request: Request,
    env: &AuthEnv,
    engine: &E,
) -> Result<Response, AuthError>
where
    E: AuthEngine + ?Sized,
{
    let Some(mut config) = request.extensions().get::<AuthConfig>().cloned() else {
        tracing::error!("Auth route reached without auth configuration; add the setup_auth layer");
        return Err(AuthError::MissingConfig);
    };

    if !config.has_secret() {
        tracing::error!("AUTH_SECRET is not configured");
        return Err(AuthError::MissingSecret);
    }

    set_env_defaults(env, &mut config);
    let request = prepare_auth_request(request, env.auth_url())?;
    tracing::debug!(method = %request.method(), uri = %request.uri(), "Delegating to auth engine");

    Ok(engine.handle(request, config).await?)
}
