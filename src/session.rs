// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

//! Server-side sessions.
//!
//! The browser only ever holds `tuiter.sid=<id>.<hmac>`; the profile lives
//! in memory here. A cookie whose signature does not verify is treated as
//! absent, and so is a session that has sat idle longer than its TTL.
//! Expired entries are swept once the store grows past
//! [`SessionStore::CLEANUP_THRESHOLD`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::SessionConfig;
use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "tuiter.sid";

struct Session {
    profile: User,
    expires_at: Instant,
}

impl Session {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct SessionStore {
    mac: HmacSha256,
    cookie_secure: bool,
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Store size above which `create` sweeps expired sessions
    pub const CLEANUP_THRESHOLD: usize = 10_000;

    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(config.secret.as_bytes())
            .map_err(|e| anyhow!("Invalid session secret: {}", e))?;
        Ok(Self {
            mac,
            cookie_secure: config.cookie_secure,
            ttl: Duration::from_secs(config.ttl_secs),
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Start a session holding `profile`; returns the signed cookie value
    pub async fn create(&self, profile: User) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        debug!("Opening session for user {}", profile.id);

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            Session {
                profile,
                expires_at: now + self.ttl,
            },
        );
        if sessions.len() > Self::CLEANUP_THRESHOLD {
            Self::retain_valid(&mut sessions, now);
        }
        drop(sessions);

        self.sign(&id)
    }

    /// Profile stored under a signed cookie value. A hit extends the session.
    pub async fn profile(&self, cookie_value: &str) -> Option<User> {
        let id = self.verify(cookie_value)?;
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let session = sessions.get_mut(id)?;
        if !session.is_valid(now) {
            sessions.remove(id);
            debug!("Session expired");
            return None;
        }
        session.expires_at = now + self.ttl;
        Some(session.profile.clone())
    }

    /// Drop every expired session; returns how many were removed
    pub async fn prune_expired(&self) -> usize {
        Self::retain_valid(&mut *self.sessions.write().await, Instant::now())
    }

    fn retain_valid(sessions: &mut HashMap<String, Session>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| session.is_valid(now));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!("Removed {} expired sessions", removed);
        }
        removed
    }

    /// Drop the session; returns whether one existed
    pub async fn destroy(&self, cookie_value: &str) -> bool {
        match self.verify(cookie_value) {
            Some(id) => self.sessions.write().await.remove(id).is_some(),
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// `Set-Cookie` value establishing the session
    pub fn set_cookie(&self, cookie_value: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            cookie_value,
            self.ttl.as_secs()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that makes the browser forget the session
    pub fn expired_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            SESSION_COOKIE
        )
    }

    fn signature(&self, id: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn sign(&self, id: &str) -> String {
        format!("{}.{}", id, hex::encode(self.signature(id)))
    }

    fn verify<'a>(&self, cookie_value: &'a str) -> Option<&'a str> {
        let (id, signature) = cookie_value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(id)
    }
}

/// Value of the session cookie in a request, if any
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}
