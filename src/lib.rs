// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Restaurant Auth Server - stateless bearer-token authentication
//!
//! This crate authenticates restaurant API callers with HS256 bearer tokens
//! and authorizes each request against an ordered route policy.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Tokens, passwords, security context and route policy
//! - `config` - Environment configuration
//! - `store` - Credential store trait and in-memory implementation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
