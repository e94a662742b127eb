// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::follows;

/// `user_following` follows `user_followed`
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = follows)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub user_following: String,
    pub user_followed: String,
    pub followed_on: DateTime<Utc>,
}
