// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a DAO backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key was taken; `field` names the offending column
    #[error("{field}: {value} already exists.")]
    Duplicate { field: String, value: String },

    /// A write referenced a row that does not exist
    #[error("{0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(DieselError),

    #[error("failed to get database connection: {0}")]
    Pool(String),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let (field, value) = info
                    .details()
                    .and_then(parse_unique_detail)
                    .unwrap_or_else(|| {
                        let field = info.column_name().or(info.constraint_name()).unwrap_or("key");
                        (field.to_string(), "value".to_string())
                    });
                StoreError::Duplicate { field, value }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::Constraint(info.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Pull `(field, value)` out of Postgres' "Key (username)=(bob) already exists." detail
fn parse_unique_detail(detail: &str) -> Option<(String, String)> {
    let rest = detail.strip_prefix("Key (")?;
    let (field, rest) = rest.split_once(")=(")?;
    let (value, _) = rest.split_once(')')?;
    Some((field.to_string(), value.to_string()))
}

/// Every way a request can fail. Converted into an HTTP response in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No such user.")]
    NoSuchUser,

    #[error("No such tuit.")]
    NoSuchTuit,

    #[error("No such message.")]
    NoSuchMessage,

    #[error("No user is logged in.")]
    NoUserLoggedIn,

    #[error("User already exists.")]
    DuplicateUser,

    #[error("Username and password do not match.")]
    IncorrectCredential,

    #[error("Empty tuit content")]
    EmptyTuitContent,

    /// Malformed or incomplete request body
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoSuchUser | ApiError::NoSuchTuit | ApiError::NoSuchMessage => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(StoreError::Duplicate { .. } | StoreError::Constraint(_))
            | ApiError::Validation(_) => {
                warn!("Rejected request: {}", self)
            }
            ApiError::Store(_) | ApiError::Internal(_) => error!("Request failed: {:?}", self),
            _ => debug!("Request failed: {}", self),
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
