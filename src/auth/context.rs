// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request security context.
//!
//! The authentication middleware builds exactly one `SecurityContext` per
//! request and stores it in the request extensions. Later stages only read
//! it: there are no setters, and nothing is shared between requests.

use std::sync::Arc;

use super::{
    claims::{Claims, Principal},
    AuthError,
};

#[derive(Debug)]
struct Authenticated {
    principal: Principal,
    claims: Claims,
}

/// Identity attached to one request: a principal with its validated
/// claims, or anonymous.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    inner: Option<Arc<Authenticated>>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal, claims: Claims) -> Self {
        Self {
            inner: Some(Arc::new(Authenticated { principal, claims })),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.inner.as_deref().map(|auth| &auth.principal)
    }

    /// The validated claims the principal was resolved from.
    pub fn claims(&self) -> Option<&Claims> {
        self.inner.as_deref().map(|auth| &auth.claims)
    }

    // Current-principal accessors for business handlers.

    /// The authenticated principal, or `Unauthenticated` for anonymous
    /// requests.
    pub fn current_user(&self) -> Result<&Principal, AuthError> {
        self.principal().ok_or(AuthError::Unauthenticated)
    }

    pub fn current_user_id(&self) -> Result<i64, AuthError> {
        self.current_user().map(|p| p.id)
    }

    pub fn current_user_email(&self) -> Result<&str, AuthError> {
        self.current_user().map(|p| p.email.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.is_some()
    }
}
