// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tuiter::api::{router, AppState};
use tuiter::config::Config;
use tuiter::dao::memory::MemoryStore;

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    /// `name=value` part of the `Set-Cookie` header, ready to send back
    pub cookie: Option<String>,
}

impl Reply {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// Full router over a fresh in-memory store
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::in_memory("integration-test-secret");
        let state = AppState::new(Arc::new(MemoryStore::new()), &config).unwrap();
        Self {
            router: router(state),
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply { status, body, cookie }
    }

    /// Raw body of a non-JSON endpoint
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(&self, uri: &str) -> Reply {
        self.send(Method::GET, uri, None, None).await
    }

    /// Create a user without opening a session; returns the id
    pub async fn create_user(&self, username: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/users",
                Some(json!({ "username": username, "password": "secret" })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.body["_id"].as_str().unwrap().to_string()
    }

    /// Sign up and return (id, cookie)
    pub async fn signup(&self, username: &str, password: &str) -> (String, String) {
        let reply = self
            .send(
                Method::POST,
                "/api/auth/signup",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        let id = reply.body["_id"].as_str().unwrap().to_string();
        (id, reply.cookie.expect("signup sets the session cookie"))
    }

    /// Post a tuit as `uid`; returns the tuit id
    pub async fn create_tuit(&self, uid: &str, text: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                &format!("/api/users/{}/tuits", uid),
                Some(json!({ "tuit": text })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.body["_id"].as_str().unwrap().to_string()
    }
}
