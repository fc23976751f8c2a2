// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::http::StatusCode;

use super::token::TokenError;
use crate::store::StoreError;

/// Authentication error type.
///
/// Every variant except `InsufficientRole` and `Internal` means "the caller
/// is not authenticated" and is rendered identically, so callers cannot tell
/// an expired token from an unknown or deactivated account.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bearer token failed validation
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Token subject has no credential record
    #[error("principal not found")]
    PrincipalNotFound,

    /// Credential record is deactivated
    #[error("principal is inactive")]
    PrincipalInactive,

    /// No principal on a route that needs one
    #[error("authentication required")]
    Unauthenticated,

    /// Principal lacks the role the route requires
    #[error("insufficient role for this operation")]
    InsufficientRole,

    /// Credential store or signing failure
    #[error("internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable code for log fields. Never sent to the client.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Token(e) => e.code(),
            AuthError::PrincipalNotFound => "principal_not_found",
            AuthError::PrincipalInactive => "principal_inactive",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Token(TokenError::Signing(_)) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::Token(_)
            | AuthError::PrincipalNotFound
            | AuthError::PrincipalInactive
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
        }
    }

    /// Message shown to the client; one fixed text per status.
    pub fn public_message(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "Full authentication is required to access this resource",
            StatusCode::FORBIDDEN => "Access denied",
            _ => crate::error::INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Internal(e.to_string())
    }
}
