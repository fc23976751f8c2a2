// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication and role-based authorization for
//! the restaurant API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with email and password (`POST /api/auth/login`)
//! 2. Server verifies the Argon2id hash and issues an HS256 token carrying
//!    `sub` (email), `userId`, `role`, `iat` and `exp`
//! 3. Client sends `Authorization: Bearer <token>` on later requests
//! 4. Per request:
//!    - [`middleware::authenticate`] validates the token, loads the record
//!      and attaches a [`SecurityContext`]
//!    - [`middleware::authorize`] applies the first matching
//!      [`RoutePolicy`] entry
//!
//! ## Security
//!
//! - No server-side sessions; each request is authenticated on its own
//! - Rejected tokens are indistinguishable to the client (uniform 401)
//! - The role in the context is the one the token was issued with; a
//!   promotion takes effect at the next login
//! - `ADMIN` satisfies every role requirement

pub mod claims;
pub mod context;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{Authority, Claims, Principal};
pub use context::SecurityContext;
pub use error::AuthError;
pub use extractor::CurrentUser;
pub use password::{PasswordError, PasswordHasher, MIN_PASSWORD_LEN};
pub use policy::{Fallback, PolicyError, Requirement, RoutePolicy};
pub use roles::Role;
pub use token::{TokenError, TokenService};
