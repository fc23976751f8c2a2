// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        middleware::{authenticate, authorize},
        Role,
    },
    error::{attach_request_path, ErrorBody},
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
        UserResponse,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod users;

/// Build the application router.
///
/// Layers, outermost first: CORS, request id, tracing, error path stamping,
/// authentication, authorization. The policy covers every route including
/// the fallback, so unknown paths still require a principal.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/users/me",
            get(users::get_current_user)
                .put(users::update_current_user)
                .delete(users::delete_current_user),
        )
        .route("/api/users/me/change-password", put(users::change_password))
        .route(
            "/api/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}/verify", put(admin::verify_user))
        .route("/api/admin/users/{id}/deactivate", put(admin::deactivate_user))
        .route("/api/admin/users/{id}/activate", put(admin::activate_user))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(state.clone(), authorize))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(from_fn(attach_request_path))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Adds the bearer token security scheme referenced by the `security`
/// attributes on protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        auth::register,
        auth::login,
        users::get_current_user,
        users::update_current_user,
        users::change_password,
        users::delete_current_user,
        users::get_user,
        users::delete_user,
        admin::list_users,
        admin::verify_user,
        admin::deactivate_user,
        admin::activate_user
    ),
    components(
        schemas(
            Role,
            ErrorBody,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserResponse,
            ChangePasswordRequest,
            UpdateProfileRequest,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and health probes"),
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Users", description = "Account self-service and lookup"),
        (name = "Admin", description = "Account administration")
    )
)]
struct ApiDoc;
