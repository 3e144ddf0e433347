// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth engine configuration and environment defaults.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::session::{AdapterUser, Jwt, Session, SessionParams};
use crate::config::AuthEnv;

/// Base path of the auth routes when none is configured.
pub const DEFAULT_BASE_PATH: &str = "/api/auth";

/// Hook invoked by the engine while it builds a session response.
///
/// Receives the raw per-session bundle and returns the session to expose.
pub type SessionCallback = Arc<dyn Fn(&SessionParams) -> Session + Send + Sync>;

/// Hook invoked by the engine whenever it issues or refreshes a token.
pub type JwtCallback = Arc<dyn Fn(JwtParams) -> Jwt + Send + Sync>;

/// Arguments of a [`JwtCallback`].
#[derive(Debug, Clone, Default)]
pub struct JwtParams {
    /// The token being issued.
    pub token: Jwt,
    /// The user that just signed in, only set on sign-in.
    pub user: Option<AdapterUser>,
}

/// Engine callback hooks.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub session: Option<SessionCallback>,
    pub jwt: Option<JwtCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("session", &self.session.is_some())
            .field("jwt", &self.jwt.is_some())
            .finish()
    }
}

/// How the engine persists sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStrategy {
    #[default]
    Jwt,
    Database,
}

/// Session options handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    #[serde(default)]
    pub strategy: SessionStrategy,
    /// Session lifetime in seconds (engine default when unset).
    #[serde(default, rename = "maxAge", skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

/// Kind of sign-in provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OAuth,
    Oidc,
    Email,
    Credentials,
    WebAuthn,
}

impl ProviderKind {
    /// Providers whose client credentials can come from the environment.
    fn reads_client_env(self) -> bool {
        matches!(self, ProviderKind::OAuth | ProviderKind::Oidc)
    }
}

/// A sign-in provider as seen by the engine.
///
/// The provider's own protocol logic lives in the engine; this is only the
/// declaration the engine is configured with.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    #[serde(default, rename = "clientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, rename = "clientSecret", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Provider-specific options passed through to the engine.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl Provider {
    /// Create a provider with `name` equal to `id`.
    pub fn new(id: impl Into<String>, kind: ProviderKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            client_id: None,
            client_secret: None,
            issuer: None,
            options: Map::new(),
        }
    }

    /// An OAuth provider, e.g. `Provider::oauth("github")`.
    pub fn oauth(id: impl Into<String>) -> Self {
        Self::new(id, ProviderKind::OAuth)
    }

    /// A credentials provider with the conventional `credentials` id.
    pub fn credentials() -> Self {
        Self::new("credentials", ProviderKind::Credentials)
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Prefix of this provider's environment variables, e.g. `AUTH_AZURE_AD`.
    pub fn env_prefix(&self) -> String {
        format!("AUTH_{}", self.id.to_ascii_uppercase().replace('-', "_"))
    }

    /// Fill unset client credentials from `AUTH_<ID>_ID`, `AUTH_<ID>_SECRET`
    /// and `AUTH_<ID>_ISSUER`.
    fn apply_env_defaults(&mut self, env: &AuthEnv) {
        if !self.kind.reads_client_env() {
            return;
        }
        let prefix = self.env_prefix();
        let lookup = |suffix: &str| env.get(&format!("{prefix}_{suffix}")).map(str::to_owned);
        if self.client_id.is_none() {
            self.client_id = lookup("ID");
        }
        if self.client_secret.is_none() {
            self.client_secret = lookup("SECRET");
        }
        if self.issuer.is_none() {
            self.issuer = lookup("ISSUER");
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Configuration handed to the auth engine.
///
/// Attached to every request by the configure stage and read by the
/// resolver and the route handler.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub providers: Vec<Provider>,
    /// Mount point of the auth routes; see [`AuthConfig::base_path`].
    pub base_path: Option<String>,
    pub secret: Option<String>,
    pub session: SessionOptions,
    pub callbacks: Callbacks,
    pub trust_host: Option<bool>,
    pub redirect_proxy_url: Option<String>,
    pub debug: bool,
    /// Engine-specific options with no typed counterpart here.
    pub options: Map<String, Value>,
}

impl AuthConfig {
    /// The configured base path, or [`DEFAULT_BASE_PATH`] when unset or empty.
    pub fn base_path(&self) -> &str {
        match self.base_path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => DEFAULT_BASE_PATH,
        }
    }

    /// Whether a non-empty secret is configured.
    pub fn has_secret(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("providers", &self.providers)
            .field("base_path", &self.base_path)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("session", &self.session)
            .field("callbacks", &self.callbacks)
            .field("trust_host", &self.trust_host)
            .field("redirect_proxy_url", &self.redirect_proxy_url)
            .field("debug", &self.debug)
            .field("options", &self.options)
            .finish()
    }
}

/// Fill unset configuration from the environment bindings.
///
/// Only fields that are still unset are touched, so applying this twice is
/// the same as applying it once. An explicitly configured secret is never
/// replaced, even by an empty one.
pub fn set_env_defaults(env: &AuthEnv, config: &mut AuthConfig) {
    if config.secret.is_none() {
        config.secret = env.secret().map(str::to_owned);
    }
    if config.base_path.as_deref().is_none_or(str::is_empty) {
        config.base_path = Some(DEFAULT_BASE_PATH.to_owned());
    }
    if config.redirect_proxy_url.is_none() {
        config.redirect_proxy_url = env.redirect_proxy_url().map(str::to_owned);
    }
    if config.trust_host.is_none() {
        config.trust_host = Some(env.trust_host());
    }
    for provider in &mut config.providers {
        provider.apply_env_defaults(env);
    }
}
