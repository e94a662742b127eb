// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

//! Likes, dislikes and bookmarks share one set of handlers, parameterized
//! by a [`Relation`] marker type.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{public, require_user, TuitParam};
use crate::api::extract::ActingUser;
use crate::api::AppState;
use crate::dao::{RelationDao, TuitDao};
use crate::error::ApiError;
use crate::models::{DeleteStatus, RelationKind, Tuit, TuitRelation, User};
use crate::services::interactions::{self, Toggle};

pub trait Relation: Send + Sync + 'static {
    const KIND: RelationKind;
}

pub struct Likes;
pub struct Dislikes;
pub struct Bookmarks;

impl Relation for Likes {
    const KIND: RelationKind = RelationKind::Like;
}

impl Relation for Dislikes {
    const KIND: RelationKind = RelationKind::Dislike;
}

impl Relation for Bookmarks {
    const KIND: RelationKind = RelationKind::Bookmark;
}

/// `PUT /api/users/:uid/<rel>/:tid`
pub async fn toggle<R: Relation>(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(TuitParam { tid }): Path<TuitParam>,
) -> Result<Json<Toggle>, ApiError> {
    let toggled = interactions::toggle(state.store.as_ref(), R::KIND, &uid, &tid).await?;
    state.metrics.record_relation(R::KIND, toggled.outcome.as_str());
    Ok(Json(toggled))
}

/// `POST /api/users/:uid/<rel>/:tid`
pub async fn set<R: Relation>(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(TuitParam { tid }): Path<TuitParam>,
) -> Result<Json<TuitRelation>, ApiError> {
    let relation = interactions::mark(state.store.as_ref(), R::KIND, &uid, &tid).await?;
    state.metrics.record_relation(R::KIND, "set");
    Ok(Json(relation))
}

/// `DELETE /api/users/:uid/<rel>/:tid`
pub async fn clear<R: Relation>(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(TuitParam { tid }): Path<TuitParam>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let status = interactions::unmark(state.store.as_ref(), R::KIND, &uid, &tid).await?;
    state.metrics.record_relation(R::KIND, "cleared");
    Ok(Json(status))
}

/// `GET /api/users/:uid/<rel>/:tid`; `null` when the user has not marked the tuit
pub async fn find_one<R: Relation>(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(TuitParam { tid }): Path<TuitParam>,
) -> Result<Json<Option<TuitRelation>>, ApiError> {
    Ok(Json(state.store.find_relation(R::KIND, &uid, &tid).await?))
}

/// `GET /api/users/:uid/<rel>`
pub async fn find_tuits_by_user<R: Relation>(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<Vec<Tuit>>, ApiError> {
    require_user(state.store.as_ref(), &uid).await?;
    Ok(Json(state.store.find_tuits_related_by_user(R::KIND, &uid).await?))
}

/// `GET /api/tuits/<rel>/:tid`
pub async fn find_users_by_tuit<R: Relation>(
    State(state): State<AppState>,
    Path(TuitParam { tid }): Path<TuitParam>,
) -> Result<Json<Vec<User>>, ApiError> {
    if state.store.find_tuit_by_id(&tid).await?.is_none() {
        return Err(ApiError::NoSuchTuit);
    }
    let users = state.store.find_users_related_to_tuit(R::KIND, &tid).await?;
    Ok(Json(public(users)))
}

/// `GET /api/<rel>`
pub async fn find_all<R: Relation>(
    State(state): State<AppState>,
) -> Result<Json<Vec<TuitRelation>>, ApiError> {
    Ok(Json(state.store.find_all_relations(R::KIND).await?))
}
