// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{PasswordHasher, RoutePolicy, TokenService};
use crate::store::CredentialStore;

/// Shared, read-only services handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
    pub store: Arc<dyn CredentialStore>,
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    pub fn new(tokens: TokenService, store: Arc<dyn CredentialStore>, policy: RoutePolicy) -> Self {
        Self {
            tokens: Arc::new(tokens),
            passwords: PasswordHasher::new(),
            store,
            policy: Arc::new(policy),
        }
    }
}
