// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AuthGuard, TokenVerifier};
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(store: InMemoryStore, verifier: TokenVerifier) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            verifier,
        }
    }

    /// Guard requiring `permission`, sharing this state's key cache.
    pub fn guard(&self, permission: &'static str) -> AuthGuard {
        AuthGuard::new(self.verifier.clone(), permission)
    }
}
