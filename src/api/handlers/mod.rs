// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

pub mod auth;
pub mod follows;
pub mod health;
pub mod messages;
pub mod metrics;
pub mod relations;
pub mod tuits;
pub mod users;

use serde::Deserialize;

use crate::dao::{Store, UserDao};
use crate::error::ApiError;
use crate::models::User;

/// `:tid` segment of a route
#[derive(Debug, Deserialize)]
pub struct TuitParam {
    pub tid: String,
}

/// `:other` segment of a route
#[derive(Debug, Deserialize)]
pub struct OtherUserParam {
    pub other: String,
}

/// Strip password hashes before users leave the service
pub fn public(users: Vec<User>) -> Vec<User> {
    users.into_iter().map(User::without_password).collect()
}

pub async fn require_user(store: &dyn Store, uid: &str) -> Result<User, ApiError> {
    store.find_user_by_id(uid).await?.ok_or(ApiError::NoSuchUser)
}
