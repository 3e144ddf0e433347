// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthEngine;
use crate::config::AuthEnv;

/// Router state for the require and handle stages.
///
/// Holds the engine and the environment bindings. Both are read-only and
/// shared behind `Arc`s; nothing here is mutated per request.
pub struct AuthState<E> {
    pub engine: Arc<E>,
    pub env: Arc<AuthEnv>,
}

impl<E: AuthEngine> AuthState<E> {
    pub fn new(engine: E, env: AuthEnv) -> Self {
        Self::from_shared(Arc::new(engine), Arc::new(env))
    }

    /// Build from an engine that is shared elsewhere (e.g. inspected by tests).
    pub fn from_shared(engine: Arc<E>, env: Arc<AuthEnv>) -> Self {
        Self { engine, env }
    }
}

impl<E> Clone for AuthState<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            env: Arc::clone(&self.env),
        }
    }
}
