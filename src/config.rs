// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the per-request environment
//! bindings (`AuthEnv`) handed to every auth stage.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_SECRET` | Shared secret handed to the auth engine | Required |
//! | `AUTH_URL` | Canonical public origin of the auth routes | Inferred from proxy headers |
//! | `AUTH_REDIRECT_PROXY_URL` | Redirect proxy used by OAuth providers | None |
//! | `AUTH_TRUST_HOST` | Trust the forwarded host (`true`/`1`) | `true` when `AUTH_URL` is set |
//! | `AUTH_ENGINE_URL` | Base URL of the external auth engine (binary only) | Required for the binary |
//! | `AUTH_PROVIDERS` | Comma-separated OAuth provider ids (binary only) | None |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::BTreeMap;
use std::fmt;

/// Shared secret used by the auth engine to sign and encrypt sessions.
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";

/// Canonical auth URL override.
///
/// When set, the origin of every auth request is rewritten to this URL and
/// proxy headers are ignored.
pub const AUTH_URL_ENV: &str = "AUTH_URL";

/// Redirect proxy URL forwarded to the engine configuration.
pub const AUTH_REDIRECT_PROXY_URL_ENV: &str = "AUTH_REDIRECT_PROXY_URL";

/// Whether the engine should trust the host it is reached on.
pub const AUTH_TRUST_HOST_ENV: &str = "AUTH_TRUST_HOST";

/// Base URL of the external auth engine used by the bundled binary.
pub const AUTH_ENGINE_URL_ENV: &str = "AUTH_ENGINE_URL";

/// Comma-separated OAuth provider ids enabled by the bundled binary.
pub const AUTH_PROVIDERS_ENV: &str = "AUTH_PROVIDERS";

/// Server bind address.
pub const HOST_ENV: &str = "HOST";

/// Server bind port.
pub const PORT_ENV: &str = "PORT";

/// Logging output format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Prefix of the variables captured by [`AuthEnv::from_env`].
const AUTH_ENV_PREFIX: &str = "AUTH_";

/// Environment bindings for one auth invocation.
///
/// A plain string map with typed accessors for the well-known keys. It is
/// immutable once built and passed explicitly to every stage, so two
/// requests in the same process may run against different bindings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthEnv {
    vars: BTreeMap<String, String>,
}

impl AuthEnv {
    /// Build bindings from arbitrary key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Capture every `AUTH_*` variable from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars().filter(|(k, _)| k.starts_with(AUTH_ENV_PREFIX)))
    }

    /// Return a copy with `key` set to `value`.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up an arbitrary binding.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// `AUTH_SECRET`, exactly as supplied (an empty value is kept).
    pub fn secret(&self) -> Option<&str> {
        self.get(AUTH_SECRET_ENV)
    }

    /// `AUTH_URL`, with an empty value treated as unset.
    pub fn auth_url(&self) -> Option<&str> {
        self.get(AUTH_URL_ENV).filter(|v| !v.is_empty())
    }

    /// `AUTH_REDIRECT_PROXY_URL`, with an empty value treated as unset.
    pub fn redirect_proxy_url(&self) -> Option<&str> {
        self.get(AUTH_REDIRECT_PROXY_URL_ENV).filter(|v| !v.is_empty())
    }

    /// Whether the engine should trust the request host.
    ///
    /// True when `AUTH_TRUST_HOST` is `true`/`1`, or when a canonical
    /// `AUTH_URL` is configured.
    pub fn trust_host(&self) -> bool {
        match self.get(AUTH_TRUST_HOST_ENV) {
            Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"),
            None => self.auth_url().is_some(),
        }
    }
}

impl fmt::Debug for AuthEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.vars {
            if key.contains("SECRET") {
                map.entry(key, &"[REDACTED]");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}
