// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use restaurant_auth_server::{
    api::router,
    auth::{PasswordHasher, Role, RoutePolicy, TokenService},
    config::{AppConfig, BootstrapAdmin, DEFAULT_LOG_FILTER},
    state::AppState,
    store::{CredentialStore, InMemoryCredentialStore, NewUser, StoreError},
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Create the configured admin account unless the email is already taken.
async fn seed_admin(
    store: &dyn CredentialStore,
    passwords: &PasswordHasher,
    admin: &BootstrapAdmin,
) -> Result<(), Box<dyn Error>> {
    let created = store.create(NewUser {
        first_name: "Admin".to_string(),
        last_name: "Account".to_string(),
        email: admin.email.clone(),
        password_hash: passwords.hash_async(admin.password.clone()).await?,
        phone_number: None,
        role: Role::Admin,
    });

    match created {
        Ok(record) => {
            tracing::info!(user_id = record.id, "bootstrap admin created");
            Ok(())
        }
        Err(StoreError::AlreadyExists(_)) => {
            tracing::info!("bootstrap admin already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.json_logs);

    let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
    let state = AppState::new(
        TokenService::new(&config.auth.secret, config.auth.token_ttl),
        store,
        RoutePolicy::restaurant_api()?,
    );

    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(state.store.as_ref(), &state.passwords, admin).await?;
    }

    let app = router(state);
    let addr = config.server.addr;

    match &config.server.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls before any TLS setup.
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                return Err("failed to install rustls crypto provider".into());
            }
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

            tracing::info!(%addr, "restaurant auth server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "restaurant auth server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}
