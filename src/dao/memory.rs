// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::dao::{new_id, FollowDao, MessageDao, RelationDao, Store, TuitDao, UserDao};
use crate::error::{StoreError, StoreResult};
use crate::models::tuit::TuitRecord;
use crate::models::{
    Follow, Message, NewMessage, NewTuit, RelationKind, Tuit, TuitRelation, TuitStats, User,
    UserUpdate,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tuits: Vec<TuitRecord>,
    relations: Vec<TuitRelation>,
    follows: Vec<Follow>,
    messages: Vec<Message>,
}

impl Tables {
    fn user(&self, uid: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == uid)
    }

    fn populate(&self, record: &TuitRecord) -> Option<Tuit> {
        let author = self.user(&record.posted_by)?.clone();
        Some(Tuit::from_record(record.clone(), author))
    }

    /// Newest first; equal timestamps keep the later insert first
    fn populate_all<'a>(&self, records: impl DoubleEndedIterator<Item = &'a TuitRecord>) -> Vec<Tuit> {
        let mut tuits: Vec<Tuit> = records.rev().filter_map(|r| self.populate(r)).collect();
        tuits.sort_by(|a, b| b.posted_on.cmp(&a.posted_on));
        tuits
    }

    fn count(&self, kind: RelationKind, tid: &str) -> i64 {
        self.relations
            .iter()
            .filter(|r| r.kind == kind && r.tuit == tid)
            .count() as i64
    }

    fn ensure_unique_username(&self, username: &str, except: Option<&str>) -> StoreResult<()> {
        let taken = self
            .users
            .iter()
            .any(|u| u.username == username && Some(u.id.as_str()) != except);
        if taken {
            return Err(StoreError::Duplicate {
                field: "username".to_string(),
                value: username.to_string(),
            });
        }
        Ok(())
    }

    fn remove_tuit_cascade(&mut self, tid: &str) -> u64 {
        let before = self.tuits.len();
        self.tuits.retain(|t| t.id != tid);
        self.relations.retain(|r| r.tuit != tid);
        (before - self.tuits.len()) as u64
    }

    fn remove_user_cascade(&mut self, uid: &str) -> u64 {
        let before = self.users.len();
        self.users.retain(|u| u.id != uid);
        if before == self.users.len() {
            return 0;
        }

        let owned: Vec<String> = self
            .tuits
            .iter()
            .filter(|t| t.posted_by == uid)
            .map(|t| t.id.clone())
            .collect();
        for tid in &owned {
            self.remove_tuit_cascade(tid);
        }
        self.relations.retain(|r| r.user != uid);
        self.follows
            .retain(|f| f.user_following != uid && f.user_followed != uid);
        self.messages.retain(|m| m.from != uid && m.to != uid);
        1
    }
}

/// In-process backend. Every operation runs under one lock, so conditional
/// writes are atomic just like their SQL counterparts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDao for MemoryStore {
    async fn find_all_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn find_user_by_id(&self, uid: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.user(uid).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique_username(&user.username, None)?;
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, uid: &str, update: UserUpdate) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(username) = &update.username {
            tables.ensure_unique_username(username, Some(uid))?;
        }
        let Some(user) = tables.users.iter_mut().find(|u| u.id == uid) else {
            return Ok(None);
        };
        user.apply(update);
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, uid: &str) -> StoreResult<u64> {
        Ok(self.tables.write().await.remove_user_cascade(uid))
    }

    async fn delete_user_by_username(&self, username: &str) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let Some(uid) = tables
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id.clone())
        else {
            return Ok(0);
        };
        Ok(tables.remove_user_cascade(&uid))
    }
}

#[async_trait]
impl TuitDao for MemoryStore {
    async fn find_all_tuits(&self) -> StoreResult<Vec<Tuit>> {
        let tables = self.tables.read().await;
        Ok(tables.populate_all(tables.tuits.iter()))
    }

    async fn find_tuits_by_user(&self, uid: &str) -> StoreResult<Vec<Tuit>> {
        let tables = self.tables.read().await;
        Ok(tables.populate_all(tables.tuits.iter().filter(|t| t.posted_by == uid)))
    }

    async fn find_tuit_by_id(&self, tid: &str) -> StoreResult<Option<Tuit>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tuits
            .iter()
            .find(|t| t.id == tid)
            .and_then(|t| tables.populate(t)))
    }

    async fn create_tuit(&self, uid: &str, tuit: NewTuit) -> StoreResult<Tuit> {
        let mut tables = self.tables.write().await;
        let author = tables
            .user(uid)
            .cloned()
            .ok_or_else(|| StoreError::Constraint(format!("tuit author {uid} does not exist")))?;
        let record = TuitRecord {
            id: new_id(),
            tuit: tuit.tuit,
            posted_by: uid.to_string(),
            posted_on: Utc::now(),
            likes: 0,
            dislikes: 0,
        };
        tables.tuits.push(record.clone());
        Ok(Tuit::from_record(record, author))
    }

    async fn update_tuit(&self, tid: &str, tuit: NewTuit) -> StoreResult<Option<Tuit>> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.tuits.iter_mut().find(|t| t.id == tid) else {
            return Ok(None);
        };
        record.tuit = tuit.tuit;
        let record = record.clone();
        Ok(tables.populate(&record))
    }

    async fn delete_tuit(&self, tid: &str) -> StoreResult<u64> {
        Ok(self.tables.write().await.remove_tuit_cascade(tid))
    }

    async fn refresh_tuit_stats(&self, tid: &str) -> StoreResult<Option<TuitStats>> {
        let mut tables = self.tables.write().await;
        let stats = TuitStats {
            likes: tables.count(RelationKind::Like, tid),
            dislikes: tables.count(RelationKind::Dislike, tid),
        };
        let Some(record) = tables.tuits.iter_mut().find(|t| t.id == tid) else {
            return Ok(None);
        };
        record.likes = stats.likes;
        record.dislikes = stats.dislikes;
        Ok(Some(stats))
    }
}

#[async_trait]
impl RelationDao for MemoryStore {
    async fn add_relation(&self, kind: RelationKind, uid: &str, tid: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .relations
            .iter()
            .any(|r| r.kind == kind && r.user == uid && r.tuit == tid);
        if exists {
            return Ok(false);
        }
        tables.relations.push(TuitRelation {
            kind,
            tuit: tid.to_string(),
            user: uid.to_string(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_relation(&self, kind: RelationKind, uid: &str, tid: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.relations.len();
        tables
            .relations
            .retain(|r| !(r.kind == kind && r.user == uid && r.tuit == tid));
        Ok(tables.relations.len() < before)
    }

    async fn find_relation(
        &self,
        kind: RelationKind,
        uid: &str,
        tid: &str,
    ) -> StoreResult<Option<TuitRelation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relations
            .iter()
            .find(|r| r.kind == kind && r.user == uid && r.tuit == tid)
            .cloned())
    }

    async fn find_all_relations(&self, kind: RelationKind) -> StoreResult<Vec<TuitRelation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relations
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect())
    }

    async fn find_tuits_related_by_user(&self, kind: RelationKind, uid: &str) -> StoreResult<Vec<Tuit>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relations
            .iter()
            .filter(|r| r.kind == kind && r.user == uid)
            .filter_map(|r| tables.tuits.iter().find(|t| t.id == r.tuit))
            .filter_map(|t| tables.populate(t))
            .collect())
    }

    async fn find_users_related_to_tuit(&self, kind: RelationKind, tid: &str) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relations
            .iter()
            .filter(|r| r.kind == kind && r.tuit == tid)
            .filter_map(|r| tables.user(&r.user).cloned())
            .collect())
    }
}

#[async_trait]
impl FollowDao for MemoryStore {
    async fn follow_user(&self, follower: &str, followed: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .follows
            .iter()
            .any(|f| f.user_following == follower && f.user_followed == followed);
        if exists {
            return Ok(false);
        }
        tables.follows.push(Follow {
            user_following: follower.to_string(),
            user_followed: followed.to_string(),
            followed_on: Utc::now(),
        });
        Ok(true)
    }

    async fn unfollow_user(&self, follower: &str, followed: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_following == follower && f.user_followed == followed));
        Ok(tables.follows.len() < before)
    }

    async fn find_follow(&self, follower: &str, followed: &str) -> StoreResult<Option<Follow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .find(|f| f.user_following == follower && f.user_followed == followed)
            .cloned())
    }

    async fn find_all_follows(&self) -> StoreResult<Vec<Follow>> {
        Ok(self.tables.read().await.follows.clone())
    }

    async fn find_following(&self, uid: &str) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.user_following == uid)
            .filter_map(|f| tables.user(&f.user_followed).cloned())
            .collect())
    }

    async fn find_followers(&self, uid: &str) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.user_followed == uid)
            .filter_map(|f| tables.user(&f.user_following).cloned())
            .collect())
    }
}

#[async_trait]
impl MessageDao for MemoryStore {
    async fn create_message(&self, from: &str, to: &str, message: NewMessage) -> StoreResult<Message> {
        let message = Message {
            id: new_id(),
            message: message.message,
            from: from.to_string(),
            to: to.to_string(),
            sent_on: Utc::now(),
        };
        self.tables.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn delete_message(&self, mid: &str) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.messages.len();
        tables.messages.retain(|m| m.id != mid);
        Ok((before - tables.messages.len()) as u64)
    }

    async fn find_messages_sent_by(&self, uid: &str) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        Ok(tables.messages.iter().filter(|m| m.from == uid).cloned().collect())
    }

    async fn find_messages_sent_to(&self, uid: &str) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        Ok(tables.messages.iter().filter(|m| m.to == uid).cloned().collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    async fn seed_user(store: &MemoryStore, username: &str) -> User {
        let user = User::from_new(new_id(), Utc::now(), NewUser::new(username, "hash"));
        store.create_user(user).await.unwrap()
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        seed_user(&store, "alice").await;

        let err = store
            .create_user(User::from_new(new_id(), Utc::now(), NewUser::new("alice", "x")))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Duplicate { ref field, .. } if field == "username"));
        assert_eq!(store.find_all_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn relation_writes_are_conditional() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let tuit = store
            .create_tuit(&alice.id, NewTuit { tuit: "hi".into() })
            .await
            .unwrap();

        assert!(store.add_relation(RelationKind::Like, &alice.id, &tuit.id).await.unwrap());
        assert!(!store.add_relation(RelationKind::Like, &alice.id, &tuit.id).await.unwrap());
        assert_eq!(store.find_all_relations(RelationKind::Like).await.unwrap().len(), 1);
        let stats = store.refresh_tuit_stats(&tuit.id).await.unwrap().unwrap();
        assert_eq!(stats, TuitStats { likes: 1, dislikes: 0 });

        assert!(store.remove_relation(RelationKind::Like, &alice.id, &tuit.id).await.unwrap());
        assert!(!store.remove_relation(RelationKind::Like, &alice.id, &tuit.id).await.unwrap());
    }

    #[tokio::test]
    async fn tuits_are_listed_newest_first() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let first = store
            .create_tuit(&alice.id, NewTuit { tuit: "first".into() })
            .await
            .unwrap();
        let second = store
            .create_tuit(&alice.id, NewTuit { tuit: "second".into() })
            .await
            .unwrap();

        let all: Vec<String> = store.find_all_tuits().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(all, vec![second.id.clone(), first.id.clone()]);

        let mine: Vec<String> = store
            .find_tuits_by_user(&alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(mine, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let tuit = store
            .create_tuit(&alice.id, NewTuit { tuit: "hi".into() })
            .await
            .unwrap();
        store.add_relation(RelationKind::Like, &bob.id, &tuit.id).await.unwrap();
        store.follow_user(&bob.id, &alice.id).await.unwrap();
        store
            .create_message(&bob.id, &alice.id, NewMessage { message: "yo".into() })
            .await
            .unwrap();

        assert_eq!(store.delete_user(&alice.id).await.unwrap(), 1);

        assert!(store.find_all_tuits().await.unwrap().is_empty());
        assert!(store.find_all_relations(RelationKind::Like).await.unwrap().is_empty());
        assert!(store.find_all_follows().await.unwrap().is_empty());
        assert!(store.find_messages_sent_by(&bob.id).await.unwrap().is_empty());
        assert_eq!(store.delete_user(&alice.id).await.unwrap(), 0);
    }
}
