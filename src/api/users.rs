// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! `/api/users/me/**` acts on the caller. `/api/users/{id}` is restricted to
//! administrators by the route policy, not by these handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::{ChangePasswordRequest, UpdateProfileRequest, UserResponse},
    state::AppState,
    store::normalize_email,
};

fn user_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("User {id} not found"))
}

/// Get the current authenticated user's account.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let record = state
        .store
        .find_by_id(user.id)?
        .ok_or_else(|| user_not_found(user.id))?;
    Ok(Json(record.into()))
}

/// Update the caller's name, email or phone number.
///
/// Tokens carry the email as subject, so changing it invalidates every token
/// issued before the change; the caller has to log in again.
#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user information", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let mut record = state
        .store
        .find_by_id(user.id)?
        .ok_or_else(|| user_not_found(user.id))?;

    if let Some(first_name) = request.first_name {
        record.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = request.last_name {
        record.last_name = last_name.trim().to_string();
    }
    if let Some(phone_number) = request.phone_number {
        let phone_number = phone_number.trim();
        record.phone_number = (!phone_number.is_empty()).then(|| phone_number.to_string());
    }
    let email_changed = match request.email {
        Some(email) if normalize_email(&email) != record.email => {
            record.email = email;
            true
        }
        _ => false,
    };

    state.store.update(&record)?;
    let record = state
        .store
        .find_by_id(user.id)?
        .ok_or_else(|| user_not_found(user.id))?;

    tracing::info!(user_id = record.id, email_changed, "profile updated");
    Ok(Json(record.into()))
}

/// Change the caller's password.
#[utoipa::path(
    put,
    path = "/api/users/me/change-password",
    tag = "Users",
    security(("bearer" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Current password incorrect or new password too short"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let mut record = state
        .store
        .find_by_id(user.id)?
        .ok_or_else(|| user_not_found(user.id))?;

    let current_matches = state
        .passwords
        .verify_async(request.current_password, Some(record.password_hash.clone()))
        .await;
    if !current_matches {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    record.password_hash = state.passwords.hash_async(request.new_password).await?;
    state.store.update(&record)?;

    tracing::info!(user_id = record.id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete the caller's own account.
#[utoipa::path(
    delete,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn delete_current_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.store.delete(user.id)?;
    tracing::info!(user_id = user.id, "account deleted by owner");
    Ok(StatusCode::NO_CONTENT)
}

/// Get any user by id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let record = state
        .store
        .find_by_id(id)?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(record.into()))
}

/// Delete any user by id.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id)?;
    tracing::info!(user_id = id, by = admin.id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Principal, Role};
    use crate::state::test_support::{seed_user, test_state};

    fn current(record: &crate::store::UserRecord) -> CurrentUser {
        CurrentUser(record.principal())
    }

    #[tokio::test]
    async fn me_returns_the_stored_record() {
        let state = test_state();
        let record = seed_user(&state, "ada@x.com", "password123", Role::User);

        let Json(me) = get_current_user(State(state), current(&record)).await.unwrap();
        assert_eq!(me.id, record.id);
        assert_eq!(me.email, "ada@x.com");
    }

    #[tokio::test]
    async fn me_for_a_vanished_record_is_404() {
        let state = test_state();
        let ghost = CurrentUser(Principal {
            id: 99,
            email: "ghost@x.com".to_string(),
            role: Role::User,
            active: true,
        });
        let err = get_current_user(State(state), ghost).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_profile_changes_only_the_given_fields() {
        let state = test_state();
        let record = seed_user(&state, "ada@x.com", "password123", Role::User);

        let Json(updated) = update_current_user(
            State(state.clone()),
            current(&record),
            Json(UpdateProfileRequest {
                first_name: Some(" Augusta ".to_string()),
                phone_number: Some("+44 20 7946 0000".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.last_name, record.last_name);
        assert_eq!(updated.email, "ada@x.com");
        assert_eq!(updated.phone_number.as_deref(), Some("+44 20 7946 0000"));

        let Json(cleared) = update_current_user(
            State(state.clone()),
            current(&record),
            Json(UpdateProfileRequest {
                phone_number: Some(String::new()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert!(cleared.phone_number.is_none());
        assert_eq!(cleared.first_name, "Augusta");

        let stored = state.store.find_by_id(record.id).unwrap().unwrap();
        assert_eq!(stored.password_hash, record.password_hash);
        assert_eq!(stored.role, Role::User);
    }

    #[tokio::test]
    async fn update_profile_email_is_normalized_and_must_be_free() {
        let state = test_state();
        let record = seed_user(&state, "ada@x.com", "password123", Role::User);
        seed_user(&state, "bob@x.com", "password123", Role::User);

        let taken = update_current_user(
            State(state.clone()),
            current(&record),
            Json(UpdateProfileRequest {
                email: Some("BOB@x.com".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(taken.status, StatusCode::BAD_REQUEST);

        let invalid = update_current_user(
            State(state.clone()),
            current(&record),
            Json(UpdateProfileRequest {
                email: Some("nope".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let Json(moved) = update_current_user(
            State(state.clone()),
            current(&record),
            Json(UpdateProfileRequest {
                email: Some("Ada.New@X.com".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(moved.email, "ada.new@x.com");
        assert!(state.store.find_by_email("ada@x.com").unwrap().is_none());
        assert_eq!(
            state.store.find_by_email("ada.new@x.com").unwrap().unwrap().id,
            record.id
        );
    }

    #[tokio::test]
    async fn change_password_requires_the_current_one() {
        let state = test_state();
        let record = seed_user(&state, "ada@x.com", "password123", Role::User);

        let wrong = change_password(
            State(state.clone()),
            current(&record),
            Json(ChangePasswordRequest {
                current_password: "not-it-at-all".to_string(),
                new_password: "new-password-1".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

        let status = change_password(
            State(state.clone()),
            current(&record),
            Json(ChangePasswordRequest {
                current_password: "password123".to_string(),
                new_password: "new-password-1".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let stored = state.store.find_by_id(record.id).unwrap().unwrap();
        assert!(state.passwords.verify("new-password-1", &stored.password_hash));
        assert!(!state.passwords.verify("password123", &stored.password_hash));
    }

    #[tokio::test]
    async fn change_password_enforces_minimum_length() {
        let state = test_state();
        let record = seed_user(&state, "ada@x.com", "password123", Role::User);

        let err = change_password(
            State(state),
            current(&record),
            Json(ChangePasswordRequest {
                current_password: "password123".to_string(),
                new_password: "short".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_me_removes_the_record() {
        let state = test_state();
        let record = seed_user(&state, "ada@x.com", "password123", Role::User);

        let status = delete_current_user(State(state.clone()), current(&record))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.store.find_by_id(record.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn admin_lookup_and_delete_by_id() {
        let state = test_state();
        let admin = seed_user(&state, "root@x.com", "password123", Role::Admin);
        let target = seed_user(&state, "ada@x.com", "password123", Role::User);

        let Json(found) = get_user(State(state.clone()), Path(target.id)).await.unwrap();
        assert_eq!(found.email, "ada@x.com");

        let status = delete_user(State(state.clone()), current(&admin), Path(target.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_user(State(state.clone()), Path(target.id)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let err = delete_user(State(state), current(&admin), Path(target.id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
