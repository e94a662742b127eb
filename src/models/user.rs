// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::users;

/// Shown instead of the hash after a successful login
pub const MASKED_PASSWORD: &str = "******";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[default]
    Personal,
    Academic,
    Professional,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Personal => "PERSONAL",
            AccountType::Academic => "ACADEMIC",
            AccountType::Professional => "PROFESSIONAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PERSONAL" => Some(AccountType::Personal),
            "ACADEMIC" => Some(AccountType::Academic),
            "PROFESSIONAL" => Some(AccountType::Professional),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    Married,
    #[default]
    Single,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Married => "MARRIED",
            MaritalStatus::Single => "SINGLE",
            MaritalStatus::Widowed => "WIDOWED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MARRIED" => Some(MaritalStatus::Married),
            "SINGLE" => Some(MaritalStatus::Single),
            "WIDOWED" => Some(MaritalStatus::Widowed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A Tuiter account.
///
/// `password` holds the Argon2 PHC string inside the store. Anything that
/// leaves the service passes through [`User::without_password`] or
/// [`User::with_masked_password`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: AccountType,
    pub marital_status: MaritalStatus,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined: DateTime<Utc>,
    pub location: Option<Location>,
}

impl User {
    /// Build a stored user from a signup/create payload whose password is already hashed
    pub fn from_new(id: String, joined: DateTime<Utc>, new_user: NewUser) -> Self {
        Self {
            id,
            username: new_user.username,
            password: new_user.password,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            profile_photo: new_user.profile_photo,
            header_image: new_user.header_image,
            account_type: new_user.account_type.unwrap_or_default(),
            marital_status: new_user.marital_status.unwrap_or_default(),
            biography: new_user.biography,
            date_of_birth: new_user.date_of_birth,
            joined,
            location: new_user.location,
        }
    }

    /// Overwrite every field present in `update`
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(password) = update.password {
            self.password = password;
        }
        if update.first_name.is_some() {
            self.first_name = update.first_name;
        }
        if update.last_name.is_some() {
            self.last_name = update.last_name;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.profile_photo.is_some() {
            self.profile_photo = update.profile_photo;
        }
        if update.header_image.is_some() {
            self.header_image = update.header_image;
        }
        if let Some(account_type) = update.account_type {
            self.account_type = account_type;
        }
        if let Some(marital_status) = update.marital_status {
            self.marital_status = marital_status;
        }
        if update.biography.is_some() {
            self.biography = update.biography;
        }
        if update.date_of_birth.is_some() {
            self.date_of_birth = update.date_of_birth;
        }
        if update.location.is_some() {
            self.location = update.location;
        }
    }

    pub fn without_password(mut self) -> Self {
        self.password.clear();
        self
    }

    pub fn with_masked_password(mut self) -> Self {
        self.password = MASKED_PASSWORD.to_string();
        self
    }
}

/// Payload for signup and `POST /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            email: None,
            profile_photo: None,
            header_image: None,
            account_type: None,
            marital_status: None,
            biography: None,
            date_of_birth: None,
            location: None,
        }
    }
}

/// Partial profile edit; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: Option<AccountType>,
    pub marital_status: Option<MaritalStatus>,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub location: Option<Location>,
}

/// Row of the `users` table
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: String,
    pub marital_status: String,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let location = match (record.latitude, record.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
            _ => None,
        };
        Self {
            id: record.id,
            username: record.username,
            password: record.password,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            profile_photo: record.profile_photo,
            header_image: record.header_image,
            account_type: AccountType::parse(&record.account_type).unwrap_or_default(),
            marital_status: MaritalStatus::parse(&record.marital_status).unwrap_or_default(),
            biography: record.biography,
            date_of_birth: record.date_of_birth,
            joined: record.joined,
            location,
        }
    }
}

/// DTO for inserting a new user row
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRecord<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub profile_photo: Option<&'a str>,
    pub header_image: Option<&'a str>,
    pub account_type: &'static str,
    pub marital_status: &'static str,
    pub biography: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl<'a> From<&'a User> for NewUserRecord<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: &user.id,
            username: &user.username,
            password: &user.password,
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
            email: user.email.as_deref(),
            profile_photo: user.profile_photo.as_deref(),
            header_image: user.header_image.as_deref(),
            account_type: user.account_type.as_str(),
            marital_status: user.marital_status.as_str(),
            biography: user.biography.as_deref(),
            date_of_birth: user.date_of_birth,
            joined: user.joined,
            latitude: user.location.map(|l| l.latitude),
            longitude: user.location.map(|l| l.longitude),
        }
    }
}

/// DTO for updating a user row; `None` leaves the column alone
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: Option<&'static str>,
    pub marital_status: Option<&'static str>,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl UserChangeset {
    /// True when the update touches no column; diesel rejects empty changesets
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.profile_photo.is_none()
            && self.header_image.is_none()
            && self.account_type.is_none()
            && self.marital_status.is_none()
            && self.biography.is_none()
            && self.date_of_birth.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

impl From<UserUpdate> for UserChangeset {
    fn from(update: UserUpdate) -> Self {
        Self {
            username: update.username,
            password: update.password,
            first_name: update.first_name,
            last_name: update.last_name,
            email: update.email,
            profile_photo: update.profile_photo,
            header_image: update.header_image,
            account_type: update.account_type.map(|a| a.as_str()),
            marital_status: update.marital_status.map(|m| m.as_str()),
            biography: update.biography,
            date_of_birth: update.date_of_birth,
            latitude: update.location.map(|l| l.latitude),
            longitude: update.location.map(|l| l.longitude),
        }
    }
}
