// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth Bridge - Authentication middleware adapter for Axum
//!
//! Connects an Axum router to an external authentication engine. Incoming
//! requests get a canonical origin (from `AUTH_URL` or the proxy's
//! `x-forwarded-*` headers) before the engine sees them, sessions are resolved
//! from request cookies, and protected routes are gated behind a resolved user.
//!
//! ## Modules
//!
//! - `api` - Gateway router (auth routes, a protected route, health)
//! - `auth` - Normalizer, session resolver, middleware, config builder
//! - `config` - Environment variables
//! - `logging` - Tracing subscriber setup
//! - `state` - Shared middleware state

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod state;

pub use auth::{
    create_config, get_user_from_session, handle_auth_routes, require_auth, setup_auth, AuthConfig,
    AuthEngine, AuthError, AuthUser, ConfigHandler, ConfigOptions, HttpEngine,
};
pub use config::AuthEnv;
pub use state::AuthState;
