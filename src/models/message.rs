// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::messages;

/// Direct message between two users
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = messages)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub message: String,
    #[diesel(column_name = sent_from)]
    pub from: String,
    #[diesel(column_name = sent_to)]
    pub to: String,
    pub sent_on: DateTime<Utc>,
}

/// Body of `POST /api/users/:uid/messages/to/:other`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub message: String,
}
