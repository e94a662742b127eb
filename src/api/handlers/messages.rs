// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use super::{require_user, OtherUserParam};
use crate::api::extract::{ActingUser, ApiJson};
use crate::api::AppState;
use crate::dao::MessageDao;
use crate::error::ApiError;
use crate::models::{DeleteStatus, Message, NewMessage};

pub async fn send_message(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
    Path(OtherUserParam { other }): Path<OtherUserParam>,
    ApiJson(message): ApiJson<NewMessage>,
) -> Result<Json<Message>, ApiError> {
    if message.message.trim().is_empty() {
        return Err(ApiError::Validation("Empty message content".to_string()));
    }
    require_user(state.store.as_ref(), &uid).await?;
    require_user(state.store.as_ref(), &other).await?;

    let sent = state.store.create_message(&uid, &other, message).await?;
    debug!("User {} sent message {} to {}", uid, sent.id, other);
    Ok(Json(sent))
}

pub async fn find_sent_messages(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<Vec<Message>>, ApiError> {
    require_user(state.store.as_ref(), &uid).await?;
    Ok(Json(state.store.find_messages_sent_by(&uid).await?))
}

pub async fn find_received_messages(
    State(state): State<AppState>,
    ActingUser(uid): ActingUser,
) -> Result<Json<Vec<Message>>, ApiError> {
    require_user(state.store.as_ref(), &uid).await?;
    Ok(Json(state.store.find_messages_sent_to(&uid).await?))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(mid): Path<String>,
) -> Result<Json<DeleteStatus>, ApiError> {
    match state.store.delete_message(&mid).await? {
        0 => Err(ApiError::NoSuchMessage),
        deleted => Ok(Json(DeleteStatus::new(deleted))),
    }
}
