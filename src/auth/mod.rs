// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Glue between an Axum router and an external authentication engine.
//!
//! ## Request Flow
//!
//! 1. `setup_auth` attaches an [`AuthConfig`] built by a [`ConfigHandler`]
//! 2. `require_auth` (optional) resolves the session from the request's
//!    cookies and either attaches an [`AuthUser`] or answers `401`
//! 3. `handle_auth_routes` serves the engine's own routes
//!    (`/api/auth/signin`, `/api/auth/callback/...`, `/api/auth/session`, ...)
//!
//! Before the engine sees a request its origin is rebuilt from `AUTH_URL` or
//! the proxy's `x-forwarded-*` headers (see [`prepare_auth_request`]).
//!
//! ## Security
//!
//! - The secret comes from the configuration or `AUTH_SECRET`, never from a
//!   config builder
//! - Auth routes refuse to run without a secret
//! - Session lookups forward only the `Cookie` header to the engine

pub mod builder;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod http_engine;
pub mod middleware;
pub mod normalize;
pub mod options;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{create_config, AdditionalOptions, ConfigHandler, ConfigOptions};
pub use engine::{AuthEngine, EngineError};
pub use error::AuthError;
pub use extractor::{Auth, AuthRequestExt, CurrentConfig, OptionalAuth};
pub use http_engine::HttpEngine;
pub use middleware::{handle_auth_request, handle_auth_routes, require_auth, setup_auth};
pub use normalize::{prepare_auth_request, NormalizeError};
pub use options::{
    set_env_defaults, AuthConfig, Callbacks, JwtCallback, JwtParams, Provider, ProviderKind,
    SessionCallback, SessionOptions, SessionStrategy, DEFAULT_BASE_PATH,
};
pub use session::{get_user_from_session, AdapterUser, AuthUser, Jwt, Session, SessionParams};
