// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the request's security context.
//!
//! Both read what [`authenticate`](super::middleware::authenticate) stored in
//! the request extensions; neither touches tokens or the credential store.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{claims::Principal, context::SecurityContext, AuthError};
use crate::error::ApiError;

/// The full context. Anonymous when the authentication stage did not run.
impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// The authenticated principal; rejects anonymous requests with 401.
///
/// ```rust,ignore
/// async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
///     // user.id, user.email, user.role
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(|ctx| ctx.principal())
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::from(AuthError::Unauthenticated).at(parts.uri.path()))
    }
}
