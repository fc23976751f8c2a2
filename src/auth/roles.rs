// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Principal roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Principal roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access; satisfies every role requirement
/// - `VerifiedUser` - May create and manage restaurants and dishes
/// - `User` - Freshly registered account, read access plus own profile
///
/// The wire form (token claims, JSON bodies) is the upper-case name:
/// `USER`, `VERIFIED_USER`, `ADMIN`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Registered but not yet verified; new registrations start here
    #[default]
    User,
    /// Verified by an administrator
    VerifiedUser,
    /// Full administrative access
    Admin,
}

impl Role {
    /// All roles, least privileged first.
    pub const ALL: [Role; 3] = [Role::User, Role::VerifiedUser, Role::Admin];

    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            // Admin can do anything
            (Role::Admin, _) => true,
            (Role::VerifiedUser, Role::VerifiedUser) => true,
            (Role::User, Role::User) => true,
            // Everything else is denied
            _ => false,
        }
    }

    /// Parse role from its wire name (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Some(Role::User),
            "VERIFIED_USER" => Some(Role::VerifiedUser),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::VerifiedUser => "VERIFIED_USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
