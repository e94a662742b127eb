// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::dao::{new_id, FollowDao, MessageDao, RelationDao, Store, TuitDao, UserDao};
use crate::db::{Database, DbConnection};
use crate::error::{StoreError, StoreResult};
use crate::models::relation::{NewTuitRelationRecord, TuitRelationRecord};
use crate::models::tuit::{NewTuitRecord, TuitRecord};
use crate::models::user::{NewUserRecord, UserChangeset, UserRecord};
use crate::models::{
    Follow, Message, NewMessage, NewTuit, RelationKind, Tuit, TuitRelation, TuitStats, User,
    UserUpdate,
};
use crate::schema::{follows, messages, tuit_relations, tuits, users};

/// Recounts both counters from live rows in one statement, so the stored
/// stats always match the relation table as of the last writer.
const REFRESH_STATS_SQL: &str = "UPDATE tuits SET \
    likes = (SELECT COUNT(*) FROM tuit_relations WHERE tuit_id = $1 AND kind = 'like'), \
    dislikes = (SELECT COUNT(*) FROM tuit_relations WHERE tuit_id = $1 AND kind = 'dislike') \
    WHERE id = $1";

/// Postgres backend built on the diesel-async connection pool
pub struct PgStore {
    db: Arc<Database>,
}

impl PgStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn conn(&self) -> StoreResult<DbConnection> {
        self.db
            .get_connection()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }

    /// Load tuits matching `ids` with their authors, in the order of `ids`
    async fn load_tuits(conn: &mut DbConnection, ids: &[String]) -> StoreResult<Vec<Tuit>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = tuits::table
            .inner_join(users::table)
            .filter(tuits::id.eq_any(ids))
            .select((TuitRecord::as_select(), UserRecord::as_select()))
            .load::<(TuitRecord, UserRecord)>(conn)
            .await?;

        let mut by_id: HashMap<String, Tuit> = rows
            .into_iter()
            .map(|(tuit, author)| (tuit.id.clone(), Tuit::from_record(tuit, author.into())))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Load users matching `ids`, in the order of `ids`
    async fn load_users(conn: &mut DbConnection, ids: &[String]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = users::table
            .filter(users::id.eq_any(ids))
            .select(UserRecord::as_select())
            .load::<UserRecord>(conn)
            .await?;

        let mut by_id: HashMap<String, User> = rows
            .into_iter()
            .map(|record| (record.id.clone(), User::from(record)))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[async_trait]
impl UserDao for PgStore {
    async fn find_all_users(&self) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        let rows = users::table
            .order_by(users::joined.asc())
            .select(UserRecord::as_select())
            .load::<UserRecord>(&mut conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_user_by_id(&self, uid: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let row = users::table
            .find(uid)
            .select(UserRecord::as_select())
            .first::<UserRecord>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRecord::as_select())
            .first::<UserRecord>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut conn = self.conn().await?;
        let row = diesel::insert_into(users::table)
            .values(NewUserRecord::from(&user))
            .returning(UserRecord::as_returning())
            .get_result::<UserRecord>(&mut conn)
            .await?;
        debug!("Created user {}", row.id);
        Ok(row.into())
    }

    async fn update_user(&self, uid: &str, update: UserUpdate) -> StoreResult<Option<User>> {
        let changeset = UserChangeset::from(update);
        if changeset.is_empty() {
            return self.find_user_by_id(uid).await;
        }

        let mut conn = self.conn().await?;
        let row = diesel::update(users::table.find(uid))
            .set(changeset)
            .returning(UserRecord::as_returning())
            .get_result::<UserRecord>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(User::from))
    }

    async fn delete_user(&self, uid: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(users::table.find(uid))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }

    async fn delete_user_by_username(&self, username: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(users::table.filter(users::username.eq(username)))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }
}

#[async_trait]
impl TuitDao for PgStore {
    async fn find_all_tuits(&self) -> StoreResult<Vec<Tuit>> {
        let mut conn = self.conn().await?;
        let rows = tuits::table
            .inner_join(users::table)
            .order_by(tuits::posted_on.desc())
            .select((TuitRecord::as_select(), UserRecord::as_select()))
            .load::<(TuitRecord, UserRecord)>(&mut conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(tuit, author)| Tuit::from_record(tuit, author.into()))
            .collect())
    }

    async fn find_tuits_by_user(&self, uid: &str) -> StoreResult<Vec<Tuit>> {
        let mut conn = self.conn().await?;
        let rows = tuits::table
            .inner_join(users::table)
            .filter(tuits::posted_by.eq(uid))
            .order_by(tuits::posted_on.desc())
            .select((TuitRecord::as_select(), UserRecord::as_select()))
            .load::<(TuitRecord, UserRecord)>(&mut conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(tuit, author)| Tuit::from_record(tuit, author.into()))
            .collect())
    }

    async fn find_tuit_by_id(&self, tid: &str) -> StoreResult<Option<Tuit>> {
        let mut conn = self.conn().await?;
        let row = tuits::table
            .inner_join(users::table)
            .filter(tuits::id.eq(tid))
            .select((TuitRecord::as_select(), UserRecord::as_select()))
            .first::<(TuitRecord, UserRecord)>(&mut conn)
            .await
            .optional()?;
        Ok(row.map(|(tuit, author)| Tuit::from_record(tuit, author.into())))
    }

    async fn create_tuit(&self, uid: &str, tuit: NewTuit) -> StoreResult<Tuit> {
        let mut conn = self.conn().await?;
        let id = new_id();
        diesel::insert_into(tuits::table)
            .values(NewTuitRecord {
                id: &id,
                tuit: &tuit.tuit,
                posted_by: uid,
                posted_on: Utc::now(),
            })
            .execute(&mut conn)
            .await?;

        Self::load_tuits(&mut conn, &[id.clone()])
            .await?
            .pop()
            .ok_or_else(|| StoreError::Constraint(format!("tuit {} vanished after insert", id)))
    }

    async fn update_tuit(&self, tid: &str, tuit: NewTuit) -> StoreResult<Option<Tuit>> {
        let mut conn = self.conn().await?;
        let updated = diesel::update(tuits::table.find(tid))
            .set(tuits::tuit.eq(&tuit.tuit))
            .execute(&mut conn)
            .await?;
        if updated == 0 {
            return Ok(None);
        }
        Ok(Self::load_tuits(&mut conn, &[tid.to_string()]).await?.pop())
    }

    async fn delete_tuit(&self, tid: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(tuits::table.find(tid))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }

    async fn refresh_tuit_stats(&self, tid: &str) -> StoreResult<Option<TuitStats>> {
        let mut conn = self.conn().await?;
        let updated = diesel::sql_query(REFRESH_STATS_SQL)
            .bind::<Text, _>(tid)
            .execute(&mut conn)
            .await?;
        if updated == 0 {
            return Ok(None);
        }

        let (likes, dislikes) = tuits::table
            .find(tid)
            .select((tuits::likes, tuits::dislikes))
            .first::<(i64, i64)>(&mut conn)
            .await?;
        Ok(Some(TuitStats { likes, dislikes }))
    }
}

#[async_trait]
impl RelationDao for PgStore {
    async fn add_relation(&self, kind: RelationKind, uid: &str, tid: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let inserted = diesel::insert_into(tuit_relations::table)
            .values(NewTuitRelationRecord {
                kind: kind.as_str(),
                user_id: uid,
                tuit_id: tid,
                created_at: Utc::now(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(inserted > 0)
    }

    async fn remove_relation(&self, kind: RelationKind, uid: &str, tid: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(
            tuit_relations::table
                .filter(tuit_relations::kind.eq(kind.as_str()))
                .filter(tuit_relations::user_id.eq(uid))
                .filter(tuit_relations::tuit_id.eq(tid)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }

    async fn find_relation(
        &self,
        kind: RelationKind,
        uid: &str,
        tid: &str,
    ) -> StoreResult<Option<TuitRelation>> {
        let mut conn = self.conn().await?;
        let row = tuit_relations::table
            .filter(tuit_relations::kind.eq(kind.as_str()))
            .filter(tuit_relations::user_id.eq(uid))
            .filter(tuit_relations::tuit_id.eq(tid))
            .select(TuitRelationRecord::as_select())
            .first::<TuitRelationRecord>(&mut conn)
            .await
            .optional()?;
        Ok(row.and_then(TuitRelationRecord::into_relation))
    }

    async fn find_all_relations(&self, kind: RelationKind) -> StoreResult<Vec<TuitRelation>> {
        let mut conn = self.conn().await?;
        let rows = tuit_relations::table
            .filter(tuit_relations::kind.eq(kind.as_str()))
            .order_by(tuit_relations::created_at.asc())
            .select(TuitRelationRecord::as_select())
            .load::<TuitRelationRecord>(&mut conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(TuitRelationRecord::into_relation)
            .collect())
    }

    async fn find_tuits_related_by_user(&self, kind: RelationKind, uid: &str) -> StoreResult<Vec<Tuit>> {
        let mut conn = self.conn().await?;
        let ids = tuit_relations::table
            .filter(tuit_relations::kind.eq(kind.as_str()))
            .filter(tuit_relations::user_id.eq(uid))
            .order_by(tuit_relations::created_at.asc())
            .select(tuit_relations::tuit_id)
            .load::<String>(&mut conn)
            .await?;
        Self::load_tuits(&mut conn, &ids).await
    }

    async fn find_users_related_to_tuit(&self, kind: RelationKind, tid: &str) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        let ids = tuit_relations::table
            .filter(tuit_relations::kind.eq(kind.as_str()))
            .filter(tuit_relations::tuit_id.eq(tid))
            .order_by(tuit_relations::created_at.asc())
            .select(tuit_relations::user_id)
            .load::<String>(&mut conn)
            .await?;
        Self::load_users(&mut conn, &ids).await
    }
}

#[async_trait]
impl FollowDao for PgStore {
    async fn follow_user(&self, follower: &str, followed: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let inserted = diesel::insert_into(follows::table)
            .values((
                follows::user_following.eq(follower),
                follows::user_followed.eq(followed),
                follows::followed_on.eq(Utc::now()),
            ))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(inserted > 0)
    }

    async fn unfollow_user(&self, follower: &str, followed: &str) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(
            follows::table
                .filter(follows::user_following.eq(follower))
                .filter(follows::user_followed.eq(followed)),
        )
        .execute(&mut conn)
        .await?;
        Ok(deleted > 0)
    }

    async fn find_follow(&self, follower: &str, followed: &str) -> StoreResult<Option<Follow>> {
        let mut conn = self.conn().await?;
        let row = follows::table
            .filter(follows::user_following.eq(follower))
            .filter(follows::user_followed.eq(followed))
            .select(Follow::as_select())
            .first::<Follow>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    async fn find_all_follows(&self) -> StoreResult<Vec<Follow>> {
        let mut conn = self.conn().await?;
        let rows = follows::table
            .order_by(follows::followed_on.asc())
            .select(Follow::as_select())
            .load::<Follow>(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn find_following(&self, uid: &str) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        let ids = follows::table
            .filter(follows::user_following.eq(uid))
            .order_by(follows::followed_on.asc())
            .select(follows::user_followed)
            .load::<String>(&mut conn)
            .await?;
        Self::load_users(&mut conn, &ids).await
    }

    async fn find_followers(&self, uid: &str) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        let ids = follows::table
            .filter(follows::user_followed.eq(uid))
            .order_by(follows::followed_on.asc())
            .select(follows::user_following)
            .load::<String>(&mut conn)
            .await?;
        Self::load_users(&mut conn, &ids).await
    }
}

#[async_trait]
impl MessageDao for PgStore {
    async fn create_message(&self, from: &str, to: &str, message: NewMessage) -> StoreResult<Message> {
        let mut conn = self.conn().await?;
        let message = Message {
            id: new_id(),
            message: message.message,
            from: from.to_string(),
            to: to.to_string(),
            sent_on: Utc::now(),
        };
        diesel::insert_into(messages::table)
            .values(&message)
            .execute(&mut conn)
            .await?;
        Ok(message)
    }

    async fn delete_message(&self, mid: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(messages::table.find(mid))
            .execute(&mut conn)
            .await?;
        Ok(deleted as u64)
    }

    async fn find_messages_sent_by(&self, uid: &str) -> StoreResult<Vec<Message>> {
        let mut conn = self.conn().await?;
        let rows = messages::table
            .filter(messages::sent_from.eq(uid))
            .order_by(messages::sent_on.asc())
            .select(Message::as_select())
            .load::<Message>(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn find_messages_sent_to(&self, uid: &str) -> StoreResult<Vec<Message>> {
        let mut conn = self.conn().await?;
        let rows = messages::table
            .filter(messages::sent_to.eq(uid))
            .order_by(messages::sent_on.asc())
            .select(Message::as_select())
            .load::<Message>(&mut conn)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
