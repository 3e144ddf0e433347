// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access to the request context set up by the auth stages.
//!
//! Use the `Auth` extractor in handlers behind `require_auth`:
//!
//! ```rust,ignore
//! async fn protected(Auth(user): Auth) -> Json<AuthUser> {
//!     Json(user)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Request},
};

use super::{AuthConfig, AuthError, AuthUser};

/// Read the auth attachments of a request.
pub trait AuthRequestExt {
    /// The configuration attached by `setup_auth`.
    fn auth_config(&self) -> Option<&AuthConfig>;
    /// The user attached by `require_auth`.
    fn auth_user(&self) -> Option<&AuthUser>;
}

impl<B> AuthRequestExt for Request<B> {
    fn auth_config(&self) -> Option<&AuthConfig> {
        self.extensions().get()
    }

    fn auth_user(&self) -> Option<&AuthUser> {
        self.extensions().get()
    }
}

impl AuthRequestExt for Parts {
    fn auth_config(&self) -> Option<&AuthConfig> {
        self.extensions.get()
    }

    fn auth_user(&self) -> Option<&AuthUser> {
        self.extensions.get()
    }
}

/// Extractor for the user resolved by `require_auth`.
///
/// Rejects with `401 Unauthorized` when the route is not behind the
/// require stage or no user was attached.
pub struct Auth(pub AuthUser);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .auth_user()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthorized)
    }
}

/// Optional authentication extractor.
///
/// Returns `None` instead of rejecting when no user is attached.
pub struct OptionalAuth(pub Option<AuthUser>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.auth_user().cloned()))
    }
}

/// Extractor for the configuration attached by `setup_auth`.
pub struct CurrentConfig(pub AuthConfig);

impl<S: Send + Sync> FromRequestParts<S> for CurrentConfig {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .auth_config()
            .cloned()
            .map(CurrentConfig)
            .ok_or(AuthError::MissingConfig)
    }
}
