// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints for account management.
//!
//! Every route here sits under `/api/admin/**`, which the route policy
//! restricts to the `ADMIN` role. Role and status changes apply to tokens
//! issued afterwards; tokens already held keep their role until they expire.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    auth::{CurrentUser, Role},
    error::ApiError,
    models::UserResponse,
    state::AppState,
    store::UserRecord,
};

fn load(state: &AppState, id: i64) -> Result<UserRecord, ApiError> {
    state
        .store
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found(format!("User {id} not found")))
}

/// List all accounts ordered by id.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All accounts", body = [UserResponse]),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.store.list()?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Promote an account to `VERIFIED_USER`.
///
/// Administrators keep their role; only the verification time is stamped.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/verify",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account verified", body = UserResponse),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn verify_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut record = load(&state, id)?;
    if record.role == Role::User {
        record.role = Role::VerifiedUser;
    }
    record.verified_at.get_or_insert_with(Utc::now);
    state.store.update(&record)?;

    tracing::info!(user_id = id, by = admin.id, "account verified");
    Ok(Json(record.into()))
}

/// Deactivate an account. Its tokens stop authenticating immediately.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/deactivate",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account deactivated", body = UserResponse),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    set_active(&state, admin.id, id, false)
}

/// Reactivate an account.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/activate",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account activated", body = UserResponse),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn activate_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    set_active(&state, admin.id, id, true)
}

fn set_active(
    state: &AppState,
    admin_id: i64,
    id: i64,
    active: bool,
) -> Result<Json<UserResponse>, ApiError> {
    let mut record = load(state, id)?;
    record.active = active;
    state.store.update(&record)?;

    tracing::info!(user_id = id, by = admin_id, active, "account status changed");
    Ok(Json(record.into()))
}
