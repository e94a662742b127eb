// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

//! Like / dislike / bookmark workflow.
//!
//! Each step is a conditional write (insert-if-absent, delete-if-present)
//! followed by one recount of both counters from live rows. Two requests
//! racing on the same (user, tuit) pair can still interleave, but neither
//! can create a duplicate row and the counters always end up equal to the
//! relation table.

use serde::Serialize;
use tracing::debug;

use crate::dao::{RelationDao, Store, TuitDao, UserDao};
use crate::error::ApiError;
use crate::models::{DeleteStatus, RelationKind, TuitRelation, TuitStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleOutcome::Added => "added",
            ToggleOutcome::Removed => "removed",
        }
    }
}

/// Result of a toggle: what happened and the recomputed counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
    pub outcome: ToggleOutcome,
    pub stats: TuitStats,
}

/// Tuit first, then user, so a missing tuit is reported as such
async fn ensure_exists(store: &dyn Store, uid: &str, tid: &str) -> Result<(), ApiError> {
    if store.find_tuit_by_id(tid).await?.is_none() {
        return Err(ApiError::NoSuchTuit);
    }
    if store.find_user_by_id(uid).await?.is_none() {
        return Err(ApiError::NoSuchUser);
    }
    Ok(())
}

async fn refresh(store: &dyn Store, kind: RelationKind, tid: &str) -> Result<TuitStats, ApiError> {
    if !kind.is_counted() {
        let tuit = store.find_tuit_by_id(tid).await?.ok_or(ApiError::NoSuchTuit)?;
        return Ok(tuit.stats);
    }
    store.refresh_tuit_stats(tid).await?.ok_or(ApiError::NoSuchTuit)
}

/// Flip the user's `kind` mark on the tuit
pub async fn toggle(
    store: &dyn Store,
    kind: RelationKind,
    uid: &str,
    tid: &str,
) -> Result<Toggle, ApiError> {
    ensure_exists(store, uid, tid).await?;

    let outcome = if store.remove_relation(kind, uid, tid).await? {
        ToggleOutcome::Removed
    } else {
        store.add_relation(kind, uid, tid).await?;
        if let Some(opposite) = kind.opposite() {
            store.remove_relation(opposite, uid, tid).await?;
        }
        ToggleOutcome::Added
    };

    let stats = refresh(store, kind, tid).await?;
    debug!("User {} {:?} {} on tuit {}: {:?}", uid, outcome, kind, tid, stats);
    Ok(Toggle { outcome, stats })
}

/// Mark the tuit, clearing the opposite mark. Idempotent.
pub async fn mark(
    store: &dyn Store,
    kind: RelationKind,
    uid: &str,
    tid: &str,
) -> Result<TuitRelation, ApiError> {
    ensure_exists(store, uid, tid).await?;

    store.add_relation(kind, uid, tid).await?;
    if let Some(opposite) = kind.opposite() {
        store.remove_relation(opposite, uid, tid).await?;
    }
    refresh(store, kind, tid).await?;

    store
        .find_relation(kind, uid, tid)
        .await?
        // removed again by a concurrent request
        .ok_or(ApiError::NoSuchTuit)
}

/// Remove the mark if present
pub async fn unmark(
    store: &dyn Store,
    kind: RelationKind,
    uid: &str,
    tid: &str,
) -> Result<DeleteStatus, ApiError> {
    ensure_exists(store, uid, tid).await?;

    let removed = store.remove_relation(kind, uid, tid).await?;
    if removed && kind.is_counted() {
        store.refresh_tuit_stats(tid).await?;
    }
    Ok(DeleteStatus::new(u64::from(removed)))
}
