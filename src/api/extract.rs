// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

//! Request extractors shared by the handlers.
//!
//! [`CurrentSession`] is resolved once per request from the `tuiter.sid`
//! cookie. [`ActingUser`] turns a `:uid` path segment into a concrete user
//! id, substituting the session's user for the `me` alias.

use std::collections::HashMap;
use std::convert::Infallible;

use anyhow::anyhow;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use super::AppState;
use crate::error::ApiError;
use crate::models::User;
use crate::session::session_cookie;

/// Path alias for the logged-in user
pub const ME: &str = "me";

/// The caller's session, if the request carried a valid cookie
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    cookie: Option<String>,
    profile: Option<User>,
}

impl CurrentSession {
    pub fn profile(&self) -> Option<&User> {
        self.profile.as_ref()
    }

    pub fn require_profile(&self) -> Result<&User, ApiError> {
        self.profile.as_ref().ok_or(ApiError::NoUserLoggedIn)
    }

    /// Signed cookie value as sent by the client
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// `me` becomes the session user's id; any other value passes through
    pub fn resolve_user_id(&self, uid: &str) -> Result<String, ApiError> {
        if uid == ME {
            Ok(self.require_profile()?.id.clone())
        } else {
            Ok(uid.to_string())
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(cookie) = session_cookie(&parts.headers) else {
            return Ok(Self::default());
        };
        let profile = state.sessions.profile(&cookie).await;
        Ok(Self {
            cookie: Some(cookie),
            profile,
        })
    }
}

/// Effective user id of the `:uid` path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        let uid = params
            .get("uid")
            .ok_or_else(|| ApiError::Internal(anyhow!("route has no :uid segment")))?;

        let session = match CurrentSession::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };
        session.resolve_user_id(uid).map(ActingUser)
    }
}

/// `axum::Json` whose rejection is reported like every other client error
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: serde::Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
