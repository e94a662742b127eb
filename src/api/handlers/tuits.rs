// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use super::require_user;
use crate::api::extract::{ActingUser, ApiJson};
use crate::api::AppState;
use crate::dao::TuitDao;
use crate::error::ApiError;
use crate::models::{DeleteStatus, NewTuit, Tuit};

pub async fn find_all_tuits(State(state): State<AppState>) -> Result<Json<Vec<Tuit>>, ApiError> {
    Ok(Json(state.store.find_all_tuits().await?))
}

pub async fn find_tuit_by_id(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> Result<Json<Tuit>, ApiError> {
    let tuit = state
        .store
        .find_tuit_by_id(&tid)
        .await?
        .ok_or(ApiError::NoSuchTuit)?;
    Ok(Json(tuit))
}

pub async fn find_tuits_by_user(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<Vec<Tuit>>, ApiError> {
    require_user(state.store.as_ref(), &uid).await?;
    Ok(Json(state.store.find_tuits_by_user(&uid).await?))
}

pub async fn create_tuit(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    ApiJson(tuit): ApiJson<NewTuit>,
) -> Result<Json<Tuit>, ApiError> {
    if tuit.is_blank() {
        return Err(ApiError::EmptyTuitContent);
    }
    require_user(state.store.as_ref(), &uid).await?;

    let created = state.store.create_tuit(&uid, tuit).await?;
    debug!("User {} posted tuit {}", uid, created.id);
    Ok(Json(created))
}

pub async fn update_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
    ApiJson(tuit): ApiJson<NewTuit>,
) -> Result<Json<Tuit>, ApiError> {
    if tuit.is_blank() {
        return Err(ApiError::EmptyTuitContent);
    }
    let updated = state
        .store
        .update_tuit(&tid, tuit)
        .await?
        .ok_or(ApiError::NoSuchTuit)?;
    Ok(Json(updated))
}

pub async fn delete_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> Result<Json<DeleteStatus>, ApiError> {
    Ok(Json(DeleteStatus::new(state.store.delete_tuit(&tid).await?)))
}
