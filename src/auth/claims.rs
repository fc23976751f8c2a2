// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried in the payload of a bearer token.
///
/// The role is a snapshot taken at issuance. Promoting or demoting the
/// principal afterwards does not change what an already issued token
/// grants; the new role applies once the holder logs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's email
    pub sub: String,

    /// Principal id at issuance
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Role at issuance
    pub role: Role,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Whether these claims are expired at `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// Narrow view of an identity consumed by the route policy.
pub trait Authority {
    fn role(&self) -> Role;
    fn is_active(&self) -> bool;
}

/// An authenticated identity.
///
/// Produced by the authentication middleware from a validated token and the
/// matching credential record: `id`, `email` and `active` come from the
/// record, `role` from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

impl Principal {
    /// Check if the principal has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Authority for Principal {
    fn role(&self) -> Role {
        self.role
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
