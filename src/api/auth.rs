// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};

use crate::{
    auth::{AuthError, Role},
    error::ApiError,
    models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    state::AppState,
    store::NewUser,
};

const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Register a new account.
///
/// New accounts are active with role `USER`.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered", body = crate::error::ErrorBody),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;
    let password_hash = state.passwords.hash_async(request.password).await?;

    let record = state.store.create(NewUser {
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        email: request.email,
        password_hash,
        phone_number: request.phone_number,
        role: Role::User,
    })?;

    tracing::info!(user_id = record.id, "account registered");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Exchange email and password for a bearer token.
///
/// Unknown email, deactivated account and wrong password are
/// indistinguishable.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 401, description = "Bad credentials", body = crate::error::ErrorBody),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let record = state
        .store
        .find_by_email(&request.email)?
        .filter(|record| record.active);

    // Exactly one Argon2 verification on every path, decoy included.
    let stored_hash = record.as_ref().map(|record| record.password_hash.clone());
    let password_matches = state
        .passwords
        .verify_async(request.password, stored_hash)
        .await;

    let record = match record {
        Some(record) if password_matches => record,
        _ => {
            tracing::debug!("login rejected");
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }
    };

    let now = Utc::now();
    let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
    let token = state
        .tokens
        .issue_at(&record.email, record.id, record.role, issued_at)
        .map_err(AuthError::from)?;

    tracing::info!(user_id = record.id, role = %record.role, "token issued");
    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        id: record.id,
        email: record.email,
        first_name: record.first_name,
        last_name: record.last_name,
        role: record.role,
        expires_at: issued_at + state.tokens.ttl(),
    }))
}
