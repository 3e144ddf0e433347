// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use auth_bridge::{
    api::router,
    auth::{
        create_config, set_env_defaults, AdditionalOptions, ConfigHandler, ConfigOptions,
        HttpEngine, Provider,
    },
    config::{
        AuthEnv, AUTH_ENGINE_URL_ENV, AUTH_PROVIDERS_ENV, DEFAULT_HOST, DEFAULT_PORT, HOST_ENV,
        PORT_ENV,
    },
    logging, AuthState,
};
use axum::extract::Request;
use url::Url;

#[tokio::main]
async fn main() {
    logging::init();

    let auth_env = AuthEnv::from_env();
    if auth_env.secret().is_none() {
        tracing::warn!("AUTH_SECRET is not set; auth routes will answer 500");
    }

    let engine_url = env::var(AUTH_ENGINE_URL_ENV)
        .expect("AUTH_ENGINE_URL must point at the auth service");
    let engine_url = Url::parse(&engine_url).expect("AUTH_ENGINE_URL is not a valid URL");
    let engine = HttpEngine::new(engine_url).expect("Failed to build auth service client");

    // Comma-separated OAuth provider ids, e.g. "github,google"
    let providers: Vec<Provider> = env::var(AUTH_PROVIDERS_ENV)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Provider::oauth)
        .collect();

    tracing::info!(
        engine = %engine.endpoint(),
        providers = providers.len(),
        "Auth engine configured"
    );

    let base_config = create_config(ConfigOptions {
        providers,
        base_path: None,
        additional: AdditionalOptions::default(),
    });

    // Auth routes check the attached secret before env defaults run, so the
    // configure stage fills AUTH_SECRET in here.
    let state = AuthState::new(engine, auth_env);
    let env_for_config = Arc::clone(&state.env);
    let config: ConfigHandler = Arc::new(move |request: &Request| {
        let mut config = base_config(request);
        set_env_defaults(&env_for_config, &mut config);
        config
    });
    let app = router(state, config);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(%addr, "Auth bridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
