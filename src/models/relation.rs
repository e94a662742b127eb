// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::tuit_relations;

/// The ways a user can mark a tuit. All three share one table and one DAO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Like,
    Dislike,
    Bookmark,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [RelationKind::Like, RelationKind::Dislike, RelationKind::Bookmark];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Like => "like",
            RelationKind::Dislike => "dislike",
            RelationKind::Bookmark => "bookmark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(RelationKind::Like),
            "dislike" => Some(RelationKind::Dislike),
            "bookmark" => Some(RelationKind::Bookmark),
            _ => None,
        }
    }

    /// URL segment used by the REST routes (`likes`, `dislikes`, `bookmarks`)
    pub fn plural(&self) -> &'static str {
        match self {
            RelationKind::Like => "likes",
            RelationKind::Dislike => "dislikes",
            RelationKind::Bookmark => "bookmarks",
        }
    }

    /// Like and dislike exclude each other
    pub fn opposite(&self) -> Option<Self> {
        match self {
            RelationKind::Like => Some(RelationKind::Dislike),
            RelationKind::Dislike => Some(RelationKind::Like),
            RelationKind::Bookmark => None,
        }
    }

    /// Whether the relation feeds a counter in the tuit's stats
    pub fn is_counted(&self) -> bool {
        !matches!(self, RelationKind::Bookmark)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "user likes/dislikes/bookmarks tuit"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuitRelation {
    pub kind: RelationKind,
    pub tuit: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tuit_relations)]
pub struct TuitRelationRecord {
    pub kind: String,
    pub user_id: String,
    pub tuit_id: String,
    pub created_at: DateTime<Utc>,
}

impl TuitRelationRecord {
    /// Rows with an unknown kind are skipped by the callers
    pub fn into_relation(self) -> Option<TuitRelation> {
        let kind = RelationKind::parse(&self.kind)?;
        Some(TuitRelation {
            kind,
            tuit: self.tuit_id,
            user: self.user_id,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tuit_relations)]
pub struct NewTuitRelationRecord<'a> {
    pub kind: &'static str,
    pub user_id: &'a str,
    pub tuit_id: &'a str,
    pub created_at: DateTime<Utc>,
}
