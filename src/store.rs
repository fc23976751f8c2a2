// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store.
//!
//! The authentication core only needs lookups; the write side exists for
//! registration, role promotion and deactivation. `InMemoryCredentialStore`
//! is the in-process implementation used by the server and the tests.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;

use crate::auth::{Principal, Role};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Canonical form of an email address used as the lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Persisted principal record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Canonical email (see [`normalize_email`])
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Identity view of this record with its current role.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            active: self.active,
        }
    }
}

/// Fields supplied when creating a record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: Role,
}

/// Storage of principal records.
///
/// Implementations must allow concurrent reads.
pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    fn find_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>>;

    /// Insert a new active record. Fails with `AlreadyExists` on a taken
    /// email.
    fn create(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Replace an existing record by id.
    fn update(&self, record: &UserRecord) -> StoreResult<()>;

    fn delete(&self, id: i64) -> StoreResult<()>;

    /// All records ordered by id.
    fn list(&self) -> StoreResult<Vec<UserRecord>>;
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, UserRecord>,
    by_email: HashMap<String, i64>,
    last_id: i64,
}

/// `RwLock`-guarded map store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    tables: RwLock<Tables>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("credential table lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("credential table lock poisoned".into()))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let tables = self.read()?;
        Ok(tables
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn create(&self, user: NewUser) -> StoreResult<UserRecord> {
        let email = normalize_email(&user.email);
        let mut tables = self.write()?;

        if tables.by_email.contains_key(&email) {
            return Err(StoreError::AlreadyExists(format!("User with email {email}")));
        }

        tables.last_id += 1;
        let record = UserRecord {
            id: tables.last_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: email.clone(),
            password_hash: user.password_hash,
            phone_number: user.phone_number,
            role: user.role,
            active: true,
            created_at: Utc::now(),
            verified_at: None,
        };

        tables.by_email.insert(email, record.id);
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: &UserRecord) -> StoreResult<()> {
        let email = normalize_email(&record.email);
        let mut tables = self.write()?;

        let previous_email = match tables.users.get(&record.id) {
            Some(existing) => existing.email.clone(),
            None => return Err(StoreError::NotFound(format!("User {}", record.id))),
        };

        if email != previous_email {
            if tables.by_email.contains_key(&email) {
                return Err(StoreError::AlreadyExists(format!("User with email {email}")));
            }
            tables.by_email.remove(&previous_email);
            tables.by_email.insert(email.clone(), record.id);
        }

        let mut stored = record.clone();
        stored.email = email;
        tables.users.insert(record.id, stored);
        Ok(())
    }

    fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.write()?;
        match tables.users.remove(&id) {
            Some(record) => {
                tables.by_email.remove(&record.email);
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("User {id}"))),
        }
    }

    fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.read()?.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}
