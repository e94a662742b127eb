// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::api::extract::{ApiJson, CurrentSession};
use crate::api::AppState;
use crate::error::ApiError;
use crate::models::{NewUser, User};
use crate::services::auth::{authenticate, create_account, Credentials};

fn outcome<T>(result: &Result<T, ApiError>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "failure"
    }
}

/// Create the account and log it in
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(new_user): ApiJson<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let created = create_account(state.store.as_ref(), new_user).await;
    state.metrics.record_auth("signup", outcome(&created));
    let user = created?;

    let cookie = state.sessions.create(user.clone()).await;
    Ok(([(header::SET_COOKIE, state.sessions.set_cookie(&cookie))], Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let authenticated = authenticate(state.store.as_ref(), &credentials).await;
    state.metrics.record_auth("login", outcome(&authenticated));
    let user = authenticated?;

    let cookie = state.sessions.create(user.clone()).await;
    info!("User {} logged in", user.username);
    Ok(([(header::SET_COOKIE, state.sessions.set_cookie(&cookie))], Json(user)))
}

/// Always succeeds; the cookie is expired even without a live session
pub async fn logout(State(state): State<AppState>, session: CurrentSession) -> impl IntoResponse {
    if let Some(cookie) = session.cookie() {
        if state.sessions.destroy(cookie).await {
            info!("Session closed");
        }
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.sessions.expired_cookie())],
        Json(json!({ "loggedOut": true })),
    )
}

/// The session's user; the password is blanked even after a login
pub async fn profile(session: CurrentSession) -> Result<Json<User>, ApiError> {
    Ok(Json(session.require_profile()?.clone().without_password()))
}
