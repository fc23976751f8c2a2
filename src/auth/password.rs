// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing with Argon2id.
//!
//! Only used when credentials are created or checked at login; requests are
//! authenticated by bearer tokens afterwards.

use std::sync::LazyLock;
#[cfg(test)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};

/// Shortest password accepted at registration or password change.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
    TooShort,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hash checked when a login names no usable account, so every attempt
/// costs one Argon2 verification. Same parameters as [`PasswordHasher`].
static DECOY_HASH: LazyLock<String> = LazyLock::new(|| {
    SaltString::encode_b64(b"decoy-salt-bytes")
        .and_then(|salt| {
            Argon2::default()
                .hash_password(b"decoy-password-never-issued", &salt)
                .map(|hash| hash.to_string())
        })
        .unwrap_or_default()
});

/// Salted, adaptive one-way password hashing.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `plaintext` into a PHC string with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.chars().count() < MIN_PASSWORD_LEN {
            return Err(PasswordError::TooShort);
        }

        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Check `plaintext` against a stored PHC hash.
    ///
    /// An unparsable stored hash never verifies.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::Relaxed);

        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is unparsable");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_async(&self, plaintext: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    ///
    /// With no stored hash the password is checked against a decoy and the
    /// result is always `false`; the cost matches a real mismatch.
    pub async fn verify_async(&self, plaintext: String, hash: Option<String>) -> bool {
        let hasher = self.clone();
        let joined = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&plaintext, &hash),
            None => {
                hasher.verify(&plaintext, &DECOY_HASH);
                false
            }
        })
        .await;

        joined.unwrap_or_else(|e| {
            tracing::error!(error = %e, "password verification task failed");
            false
        })
    }

    /// Number of `verify` calls made through this hasher and its clones.
    #[cfg(test)]
    pub(crate) fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHasher(argon2id)")
    }
}
