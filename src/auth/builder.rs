// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Configuration handlers.

use std::sync::Arc;

use axum::extract::Request;
use serde_json::{Map, Value};

use super::options::{AuthConfig, Callbacks, Provider, SessionOptions, DEFAULT_BASE_PATH};

/// Produces the configuration for a request; consumed by `setup_auth`.
pub type ConfigHandler = Arc<dyn Fn(&Request) -> AuthConfig + Send + Sync>;

/// Engine options beyond providers and base path.
///
/// There is no `secret` here: the secret only comes from
/// the environment (`AUTH_SECRET`) via `set_env_defaults`.
#[derive(Debug, Clone, Default)]
pub struct AdditionalOptions {
    pub session: SessionOptions,
    pub callbacks: Callbacks,
    pub trust_host: Option<bool>,
    pub redirect_proxy_url: Option<String>,
    pub debug: bool,
    pub options: Map<String, Value>,
}

/// Input of [`create_config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Auth providers to use for authentication
    pub providers: Vec<Provider>,
    /// Custom base path for auth routes (default: `/api/auth`)
    pub base_path: Option<String>,
    pub additional: AdditionalOptions,
}

/// Build a [`ConfigHandler`] that returns the same configuration for
/// every request.
///
/// ```rust,ignore
/// let handler = create_config(ConfigOptions {
///     providers: vec![Provider::oauth("github")],
///     ..Default::default()
/// });
///
/// let app = Router::new()
///     .route("/api/auth/{*rest}", any(handle_auth_routes::<MyEngine>))
///     .with_state(state)
///     .layer(axum::middleware::from_fn_with_state(handler, setup_auth));
/// ```
pub fn create_config(options: ConfigOptions) -> ConfigHandler {
    let ConfigOptions {
        providers,
        base_path,
        additional,
    } = options;

    let config = AuthConfig {
        providers,
        base_path: Some(base_path.unwrap_or_else(|| DEFAULT_BASE_PATH.to_owned())),
        secret: None,
        session: additional.session,
        callbacks: additional.callbacks,
        trust_host: additional.trust_host,
        redirect_proxy_url: additional.redirect_proxy_url,
        debug: additional.debug,
        options: additional.options,
    };

    Arc::new(move |_request: &Request| config.clone())
}
