// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::anyhow;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dao::{new_id, Store, UserDao};
use crate::error::{ApiError, StoreError};
use crate::models::{NewUser, User};

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Salted Argon2 hash in PHC string form, computed on the blocking pool
pub async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(anyhow!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow!("Password hashing task failed: {}", e)))?
}

/// False for a wrong password and for a stored value that is not a PHC string
pub async fn verify_password(password: &str, stored: &str) -> Result<bool, ApiError> {
    let password = password.to_owned();
    let stored = stored.to_owned();
    tokio::task::spawn_blocking(move || match PasswordHash::new(&stored) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow!("Password check task failed: {}", e)))
}

/// Hash the password and persist a new account.
///
/// Returns the stored user with the password blanked.
pub async fn create_account(store: &dyn Store, mut new_user: NewUser) -> Result<User, ApiError> {
    if new_user.username.trim().is_empty() || new_user.password.is_empty() {
        return Err(ApiError::Validation("username and password are required".to_string()));
    }
    if store.find_user_by_username(&new_user.username).await?.is_some() {
        return Err(ApiError::DuplicateUser);
    }

    new_user.password = hash_password(&new_user.password).await?;
    let user = User::from_new(new_id(), Utc::now(), new_user);
    let created = match store.create_user(user).await {
        Ok(created) => created,
        // lost a race against a concurrent signup for the same name
        Err(StoreError::Duplicate { .. }) => return Err(ApiError::DuplicateUser),
        Err(e) => return Err(e.into()),
    };

    info!("Created account {} ({})", created.username, created.id);
    Ok(created.without_password())
}

/// Check credentials and return the matching user with the password masked
pub async fn authenticate(store: &dyn Store, credentials: &Credentials) -> Result<User, ApiError> {
    let user = store
        .find_user_by_username(&credentials.username)
        .await?
        .ok_or(ApiError::NoSuchUser)?;

    if !verify_password(&credentials.password, &user.password).await? {
        debug!("Password mismatch for {}", credentials.username);
        return Err(ApiError::IncorrectCredential);
    }

    Ok(user.with_masked_password())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::memory::MemoryStore;

    #[tokio::test]
    async fn hashes_are_salted_and_verifiable() {
        let first = hash_password("hunter2").await.unwrap();
        let second = hash_password("hunter2").await.unwrap();

        assert_ne!(first, second);
        assert!(verify_password("hunter2", &first).await.unwrap());
        assert!(!verify_password("hunter3", &first).await.unwrap());
        assert!(!verify_password("hunter2", "plain-text").await.unwrap());
    }

    #[tokio::test]
    async fn hashing_leaves_the_runtime_free() {
        let order = std::sync::Mutex::new(Vec::new());

        // single-threaded runtime: the second future only runs if hashing yields
        tokio::join!(
            async {
                hash_password("hunter2").await.unwrap();
                order.lock().unwrap().push("hash");
            },
            async {
                order.lock().unwrap().push("other");
            },
        );

        assert_eq!(*order.lock().unwrap(), ["other", "hash"]);
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected_without_second_record() {
        let store = MemoryStore::new();
        create_account(&store, NewUser::new("alice", "pw")).await.unwrap();

        let err = create_account(&store, NewUser::new("alice", "other")).await.unwrap_err();

        assert!(matches!(err, ApiError::DuplicateUser));
        assert_eq!(store.find_all_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn created_account_stores_hash_but_returns_blank() {
        let store = MemoryStore::new();
        let created = create_account(&store, NewUser::new("alice", "pw")).await.unwrap();
        let stored = store.find_user_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(created.password, "");
        assert!(stored.password.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn authenticate_distinguishes_unknown_user_and_bad_password() {
        let store = MemoryStore::new();
        create_account(&store, NewUser::new("alice", "pw")).await.unwrap();

        let unknown = authenticate(
            &store,
            &Credentials { username: "bob".into(), password: "pw".into() },
        )
        .await
        .unwrap_err();
        assert!(matches!(unknown, ApiError::NoSuchUser));

        let wrong = authenticate(
            &store,
            &Credentials { username: "alice".into(), password: "nope".into() },
        )
        .await
        .unwrap_err();
        assert!(matches!(wrong, ApiError::IncorrectCredential));

        let user = authenticate(
            &store,
            &Credentials { username: "alice".into(), password: "pw".into() },
        )
        .await
        .unwrap();
        assert_eq!(user.password, "******");
    }
}
