// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{any, get},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    auth::{handle_auth_routes, require_auth, setup_auth, Auth, AuthEngine, AuthUser, ConfigHandler},
    state::AuthState,
};

pub mod health;

/// Route pattern served by the auth engine.
///
/// Uses the default base path; the engine itself still reads the path from
/// the attached configuration.
pub const AUTH_ROUTES: &str = "/api/auth/{*rest}";

/// Build the gateway router.
///
/// - `ANY /api/auth/*` is handled by the engine
/// - `GET /api/protected` requires a session and echoes the resolved user
/// - `GET /health` is public
pub fn router<E: AuthEngine>(state: AuthState<E>, config: ConfigHandler) -> Router {
    let protected = Router::new()
        .route("/api/protected", get(protected))
        .route_layer(from_fn_with_state(state.clone(), require_auth::<E>));

    Router::new()
        .route(AUTH_ROUTES, any(handle_auth_routes::<E>))
        .with_state(state)
        .merge(protected)
        .route("/health", get(health::liveness))
        .layer(from_fn_with_state(config, setup_auth))
        .layer(TraceLayer::new_for_http())
}

/// Return the authenticated user.
async fn protected(Auth(user): Auth) -> Json<AuthUser> {
    Json(user)
}
