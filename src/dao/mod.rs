// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

//! Data-access objects.
//!
//! One trait per resource. Both backends ([`postgres::PgStore`] and
//! [`memory::MemoryStore`]) implement all of them, so handlers and services
//! only ever see `&dyn Store`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{
    Follow, Message, NewMessage, NewTuit, RelationKind, Tuit, TuitRelation, TuitStats, User,
    UserUpdate,
};

#[async_trait]
pub trait UserDao: Send + Sync {
    async fn find_all_users(&self) -> StoreResult<Vec<User>>;

    async fn find_user_by_id(&self, uid: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Persist `user` as given; the caller has already hashed the password.
    /// A taken username is reported as [`crate::error::StoreError::Duplicate`].
    async fn create_user(&self, user: User) -> StoreResult<User>;

    async fn update_user(&self, uid: &str, update: UserUpdate) -> StoreResult<Option<User>>;

    /// Removes the user together with everything that references them
    async fn delete_user(&self, uid: &str) -> StoreResult<u64>;

    async fn delete_user_by_username(&self, username: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait TuitDao: Send + Sync {
    async fn find_all_tuits(&self) -> StoreResult<Vec<Tuit>>;

    async fn find_tuits_by_user(&self, uid: &str) -> StoreResult<Vec<Tuit>>;

    async fn find_tuit_by_id(&self, tid: &str) -> StoreResult<Option<Tuit>>;

    async fn create_tuit(&self, uid: &str, tuit: NewTuit) -> StoreResult<Tuit>;

    async fn update_tuit(&self, tid: &str, tuit: NewTuit) -> StoreResult<Option<Tuit>>;

    async fn delete_tuit(&self, tid: &str) -> StoreResult<u64>;

    /// Recount likes and dislikes from live relation rows and store them on
    /// the tuit in a single write. `None` if the tuit is gone.
    async fn refresh_tuit_stats(&self, tid: &str) -> StoreResult<Option<TuitStats>>;
}

#[async_trait]
pub trait RelationDao: Send + Sync {
    /// Insert unless already present. Returns whether a row was created.
    async fn add_relation(&self, kind: RelationKind, uid: &str, tid: &str) -> StoreResult<bool>;

    /// Delete if present. Returns whether a row was removed.
    async fn remove_relation(&self, kind: RelationKind, uid: &str, tid: &str) -> StoreResult<bool>;

    async fn find_relation(
        &self,
        kind: RelationKind,
        uid: &str,
        tid: &str,
    ) -> StoreResult<Option<TuitRelation>>;

    async fn find_all_relations(&self, kind: RelationKind) -> StoreResult<Vec<TuitRelation>>;

    /// Tuits the user has marked, authors populated
    async fn find_tuits_related_by_user(&self, kind: RelationKind, uid: &str) -> StoreResult<Vec<Tuit>>;

    /// Users who marked the tuit
    async fn find_users_related_to_tuit(&self, kind: RelationKind, tid: &str) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait FollowDao: Send + Sync {
    /// `follower` starts following `followed`. Returns whether a row was created.
    async fn follow_user(&self, follower: &str, followed: &str) -> StoreResult<bool>;

    async fn unfollow_user(&self, follower: &str, followed: &str) -> StoreResult<bool>;

    async fn find_follow(&self, follower: &str, followed: &str) -> StoreResult<Option<Follow>>;

    async fn find_all_follows(&self) -> StoreResult<Vec<Follow>>;

    /// Users that `uid` follows
    async fn find_following(&self, uid: &str) -> StoreResult<Vec<User>>;

    /// Users following `uid`
    async fn find_followers(&self, uid: &str) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait MessageDao: Send + Sync {
    async fn create_message(&self, from: &str, to: &str, message: NewMessage) -> StoreResult<Message>;

    async fn delete_message(&self, mid: &str) -> StoreResult<u64>;

    async fn find_messages_sent_by(&self, uid: &str) -> StoreResult<Vec<Message>>;

    async fn find_messages_sent_to(&self, uid: &str) -> StoreResult<Vec<Message>>;
}

/// Everything the HTTP layer needs from a backend
#[async_trait]
pub trait Store: UserDao + TuitDao + RelationDao + FollowDao + MessageDao {
    /// Liveness check used by `/health`
    async fn ping(&self) -> StoreResult<()>;

    fn backend(&self) -> &'static str;
}

/// New document id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
