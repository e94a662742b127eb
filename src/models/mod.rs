// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

pub mod user;
pub mod tuit;
pub mod relation;
pub mod follow;
pub mod message;

pub use follow::Follow;
pub use message::{Message, NewMessage};
pub use relation::{RelationKind, TuitRelation};
pub use tuit::{NewTuit, Tuit, TuitStats};
pub use user::{AccountType, Location, MaritalStatus, NewUser, User, UserUpdate};

/// Response body of every delete endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatus {
    pub deleted_count: u64,
}

impl DeleteStatus {
    pub fn new(deleted_count: u64) -> Self {
        Self { deleted_count }
    }
}
