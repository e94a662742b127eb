// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::models::user::User;
use crate::schema::tuits;

/// Denormalized interaction counters kept on every tuit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitStats {
    pub likes: i64,
    pub dislikes: i64,
}

/// A tuit with its author populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuit {
    #[serde(rename = "_id")]
    pub id: String,
    pub tuit: String,
    pub posted_by: User,
    pub posted_on: DateTime<Utc>,
    pub stats: TuitStats,
}

impl Tuit {
    pub fn from_record(record: TuitRecord, author: User) -> Self {
        Self {
            id: record.id,
            tuit: record.tuit,
            posted_by: author.without_password(),
            posted_on: record.posted_on,
            stats: TuitStats {
                likes: record.likes,
                dislikes: record.dislikes,
            },
        }
    }
}

/// Payload for creating or editing a tuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTuit {
    pub tuit: String,
}

impl NewTuit {
    pub fn is_blank(&self) -> bool {
        self.tuit.trim().is_empty()
    }
}

/// Row of the `tuits` table
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tuits)]
pub struct TuitRecord {
    pub id: String,
    pub tuit: String,
    pub posted_by: String,
    pub posted_on: DateTime<Utc>,
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tuits)]
pub struct NewTuitRecord<'a> {
    pub id: &'a str,
    pub tuit: &'a str,
    pub posted_by: &'a str,
    pub posted_on: DateTime<Utc>,
}
