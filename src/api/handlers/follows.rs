// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use super::{public, require_user, OtherUserParam};
use crate::api::extract::ActingUser;
use crate::api::AppState;
use crate::dao::FollowDao;
use crate::error::ApiError;
use crate::models::{DeleteStatus, Follow, User};

/// `:uid` starts following `:other`; repeating the call is a no-op
pub async fn follow_user(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(OtherUserParam { other }): Path<OtherUserParam>,
) -> Result<Json<Follow>, ApiError> {
    if uid == other {
        return Err(ApiError::Validation("Users cannot follow themselves.".to_string()));
    }
    require_user(state.store.as_ref(), &uid).await?;
    require_user(state.store.as_ref(), &other).await?;

    if state.store.follow_user(&uid, &other).await? {
        debug!("User {} now follows {}", uid, other);
    }
    state
        .store
        .find_follow(&uid, &other)
        .await?
        // one of the users was deleted in between
        .ok_or(ApiError::NoSuchUser)
        .map(Json)
}

pub async fn unfollow_user(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(OtherUserParam { other }): Path<OtherUserParam>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let removed = state.store.unfollow_user(&uid, &other).await?;
    Ok(Json(DeleteStatus::new(u64::from(removed))))
}

/// `null` when `:uid` does not follow `:other`
pub async fn find_follow(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(OtherUserParam { other }): Path<OtherUserParam>,
) -> Result<Json<Option<Follow>>, ApiError> {
    Ok(Json(state.store.find_follow(&uid, &other).await?))
}

pub async fn find_following(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<Vec<User>>, ApiError> {
    require_user(state.store.as_ref(), &uid).await?;
    Ok(Json(public(state.store.find_following(&uid).await?)))
}

pub async fn find_followers(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<Vec<User>>, ApiError> {
    require_user(state.store.as_ref(), &uid).await?;
    Ok(Json(public(state.store.find_followers(&uid).await?)))
}

pub async fn find_all_follows(State(state): State<AppState>) -> Result<Json<Vec<Follow>>, ApiError> {
    Ok(Json(state.store.find_all_follows().await?))
}
