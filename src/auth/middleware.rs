// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization middleware for Axum.
//!
//! Two stages run in front of every handler:
//!
//! 1. [`authenticate`] turns an optional `Authorization: Bearer <token>`
//!    header into a [`SecurityContext`] and stores it in the request
//!    extensions. A missing or rejected token yields an anonymous context;
//!    it never short-circuits the request by itself.
//! 2. [`authorize`] evaluates the [`RoutePolicy`](super::RoutePolicy) for the
//!    request method and path against that context.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/users/me", get(me))
//!     .layer(from_fn_with_state(state.clone(), authorize))
//!     .layer(from_fn_with_state(state.clone(), authenticate))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{
    claims::{Claims, Principal},
    context::SecurityContext,
    token::TokenService,
    AuthError,
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::CredentialStore;

const BEARER_SCHEME: &str = "Bearer";

/// Token carried by an `Authorization` header using the bearer scheme.
///
/// The scheme name is matched case-insensitively. Other schemes, non-ASCII
/// header values and empty tokens count as no token at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Build the security context for one request.
///
/// Only a credential store failure is an error; every token or principal
/// problem degrades to an anonymous context.
pub fn resolve_context(
    tokens: &TokenService,
    store: &dyn CredentialStore,
    headers: &HeaderMap,
) -> Result<SecurityContext, AuthError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(SecurityContext::anonymous());
    };

    match resolve_principal(tokens, store, token) {
        Ok((principal, claims)) => {
            tracing::debug!(user_id = principal.id, role = %principal.role, "bearer token accepted");
            Ok(SecurityContext::authenticated(principal, claims))
        }
        Err(e @ AuthError::Internal(_)) => Err(e),
        Err(e) => {
            tracing::debug!(reason = e.error_code(), "bearer token not accepted");
            Ok(SecurityContext::anonymous())
        }
    }
}

fn resolve_principal(
    tokens: &TokenService,
    store: &dyn CredentialStore,
    token: &str,
) -> Result<(Principal, Claims), AuthError> {
    let claims = tokens.validate(token)?;

    // A record that reuses the subject's email under another id is a
    // different principal.
    let record = store
        .find_by_email(&claims.sub)?
        .filter(|record| record.id == claims.user_id)
        .ok_or(AuthError::PrincipalNotFound)?;

    if !record.active {
        return Err(AuthError::PrincipalInactive);
    }

    // Role is the snapshot taken at issuance.
    let principal = Principal {
        id: record.id,
        email: record.email,
        role: claims.role,
        active: record.active,
    };
    Ok((principal, claims))
}

/// Authentication stage: attaches a [`SecurityContext`] to the request.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match resolve_context(&state.tokens, state.store.as_ref(), request.headers()) {
        Ok(context) => context,
        Err(e) => {
            tracing::error!(error = %e, "authentication aborted");
            return ApiError::from(&e).into_response();
        }
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Authorization stage: applies the route policy to the attached context.
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let decision = {
        let anonymous = SecurityContext::anonymous();
        let context = request
            .extensions()
            .get::<SecurityContext>()
            .unwrap_or(&anonymous);
        state
            .policy
            .authorize(request.method(), request.uri().path(), context.principal())
    };

    match decision {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = e.error_code(),
                "request denied"
            );
            ApiError::from(&e).into_response()
        }
    }
}
