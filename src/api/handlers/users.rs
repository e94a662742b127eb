// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use super::{public, require_user};
use crate::api::extract::{ActingUser, ApiJson};
use crate::api::AppState;
use crate::dao::UserDao;
use crate::error::ApiError;
use crate::models::{DeleteStatus, NewUser, User, UserUpdate};
use crate::services::auth::{create_account, hash_password};

pub async fn find_all_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.find_all_users().await?;
    Ok(Json(public(users)))
}

pub async fn find_user_by_id(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<User>, ApiError> {
    let user = require_user(state.store.as_ref(), &uid).await?;
    Ok(Json(user.without_password()))
}

pub async fn find_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or(ApiError::NoSuchUser)?;
    Ok(Json(user.without_password()))
}

/// Administrative create; does not open a session
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(new_user): ApiJson<NewUser>,
) -> Result<Json<User>, ApiError> {
    let user = create_account(state.store.as_ref(), new_user).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    ApiJson(mut update): ApiJson<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    if let Some(password) = update.password.take() {
        if password.is_empty() {
            return Err(ApiError::Validation("password must not be empty".to_string()));
        }
        update.password = Some(hash_password(&password).await?);
    }

    let user = state
        .store
        .update_user(&uid, update)
        .await?
        .ok_or(ApiError::NoSuchUser)?;
    Ok(Json(user.without_password()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = state.store.delete_user(&uid).await?;
    if deleted > 0 {
        info!("Deleted user {}", uid);
    }
    Ok(Json(DeleteStatus::new(deleted)))
}

pub async fn delete_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = state.store.delete_user_by_username(&username).await?;
    if deleted > 0 {
        info!("Deleted user {}", username);
    }
    Ok(Json(DeleteStatus::new(deleted)))
}
