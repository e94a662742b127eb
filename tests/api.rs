// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn health_reports_backend() {
    let app = TestApp::new();

    let reply = app.get("/health").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "healthy");
    assert_eq!(reply.body["store"], "memory");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = TestApp::new();

    let reply = app.get("/api/users/does-not-exist").await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.error(), "No such user.");
}

#[tokio::test]
async fn toggling_unknown_tuit_is_not_found() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;

    for rel in ["likes", "dislikes"] {
        let reply = app
            .send(Method::PUT, &format!("/api/users/{}/{}/nope", uid, rel), None, None)
            .await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.error(), "No such tuit.");
    }
}

#[test_log::test(tokio::test)]
async fn toggling_like_twice_leaves_tuit_unliked() {
    let app = TestApp::new();
    let author = app.create_user("alice").await;
    let fan = app.create_user("bob").await;
    let tid = app.create_tuit(&author, "hello world").await;
    let uri = format!("/api/users/{}/likes/{}", fan, tid);

    let first = app.send(Method::PUT, &uri, None, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["outcome"], "added");
    assert_eq!(first.body["stats"]["likes"], 1);

    let second = app.send(Method::PUT, &uri, None, None).await;
    assert_eq!(second.body["outcome"], "removed");
    assert_eq!(second.body["stats"]["likes"], 0);

    assert_eq!(app.get("/api/likes").await.body, json!([]));
    assert_eq!(app.get(&format!("/api/tuits/{}", tid)).await.body["stats"]["likes"], 0);
}

#[tokio::test]
async fn liking_clears_previous_dislike() {
    let app = TestApp::new();
    let author = app.create_user("alice").await;
    let fan = app.create_user("bob").await;
    let tid = app.create_tuit(&author, "hot take").await;

    let disliked = app
        .send(Method::PUT, &format!("/api/users/{}/dislikes/{}", fan, tid), None, None)
        .await;
    assert_eq!(disliked.body["stats"], json!({ "likes": 0, "dislikes": 1 }));

    let liked = app
        .send(Method::PUT, &format!("/api/users/{}/likes/{}", fan, tid), None, None)
        .await;
    assert_eq!(liked.body["stats"], json!({ "likes": 1, "dislikes": 0 }));

    let dislike = app.get(&format!("/api/users/{}/dislikes/{}", fan, tid)).await;
    assert_eq!(dislike.body, json!(null));
    assert_eq!(app.get(&format!("/api/tuits/{}", tid)).await.body["stats"]["dislikes"], 0);
}

#[tokio::test]
async fn liked_tuits_round_trip() {
    let app = TestApp::new();
    let author = app.create_user("alice").await;
    let fan = app.create_user("bob").await;
    let tid = app.create_tuit(&author, "round trip").await;

    let set = app
        .send(Method::POST, &format!("/api/users/{}/likes/{}", fan, tid), None, None)
        .await;
    assert_eq!(set.status, StatusCode::OK);
    assert_eq!(set.body["kind"], "like");

    let liked = app.get(&format!("/api/users/{}/likes", fan)).await;
    let liked = liked.body.as_array().unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0]["_id"], tid.as_str());
    assert_eq!(liked[0]["postedBy"]["_id"], author.as_str());

    let likers = app.get(&format!("/api/tuits/likes/{}", tid)).await;
    assert_eq!(likers.body[0]["_id"], fan.as_str());
    assert_eq!(likers.body[0]["password"], "");

    let cleared = app
        .send(Method::DELETE, &format!("/api/users/{}/likes/{}", fan, tid), None, None)
        .await;
    assert_eq!(cleared.body, json!({ "deletedCount": 1 }));

    assert_eq!(app.get(&format!("/api/users/{}/likes", fan)).await.body, json!([]));
    assert_eq!(app.get(&format!("/api/tuits/{}", tid)).await.body["stats"]["likes"], 0);
}

#[tokio::test]
async fn bookmarks_leave_counters_alone() {
    let app = TestApp::new();
    let author = app.create_user("alice").await;
    let reader = app.create_user("bob").await;
    let tid = app.create_tuit(&author, "save for later").await;

    let toggled = app
        .send(Method::PUT, &format!("/api/users/{}/bookmarks/{}", reader, tid), None, None)
        .await;
    assert_eq!(toggled.body["outcome"], "added");
    assert_eq!(toggled.body["stats"], json!({ "likes": 0, "dislikes": 0 }));

    let bookmarked = app.get(&format!("/api/users/{}/bookmarks", reader)).await;
    assert_eq!(bookmarked.body.as_array().unwrap().len(), 1);
    assert_eq!(app.get("/api/bookmarks").await.body.as_array().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn duplicate_signup_is_rejected() {
    let app = TestApp::new();
    app.signup("alice", "pw").await;

    let reply = app
        .send(
            Method::POST,
            "/api/auth/signup",
            Some(json!({ "username": "alice", "password": "other" })),
            None,
        )
        .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.error(), "User already exists.");
    assert!(reply.cookie.is_none());
    assert_eq!(app.get("/api/users").await.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn wrong_password_opens_no_session() {
    let app = TestApp::new();
    app.signup("alice", "right").await;

    let reply = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "wrong" })),
            None,
        )
        .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.error(), "Username and password do not match.");
    assert!(reply.cookie.is_none());

    let profile = app.get("/api/auth/profile").await;
    assert_eq!(profile.status, StatusCode::FORBIDDEN);
    assert_eq!(profile.error(), "No user is logged in.");
}

#[tokio::test]
async fn login_unknown_user_is_not_found() {
    let app = TestApp::new();

    let reply = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "username": "ghost", "password": "pw" })),
            None,
        )
        .await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.error(), "No such user.");
}

#[tokio::test]
async fn login_profile_logout_cycle() {
    let app = TestApp::new();
    let (uid, _) = app.signup("alice", "pw").await;

    let login = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "pw" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["password"], "******");
    let cookie = login.cookie.unwrap();

    let profile = app.send(Method::GET, "/api/auth/profile", None, Some(&cookie)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["_id"], uid.as_str());
    assert_eq!(profile.body["password"], "");

    let logout = app.send(Method::POST, "/api/auth/logout", None, Some(&cookie)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.cookie.as_deref(), Some("tuiter.sid="));

    let after = app.send(Method::GET, "/api/auth/profile", None, Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn signup_blanks_password_and_logs_in() {
    let app = TestApp::new();

    let reply = app
        .send(
            Method::POST,
            "/api/auth/signup",
            Some(json!({ "username": "alice", "password": "pw", "firstName": "Alice" })),
            None,
        )
        .await;
    assert_eq!(reply.body["password"], "");
    assert_eq!(reply.body["firstName"], "Alice");
    assert_eq!(reply.body["accountType"], "PERSONAL");

    let profile = app
        .send(Method::GET, "/api/auth/profile", None, reply.cookie.as_deref())
        .await;
    assert_eq!(profile.body["username"], "alice");
}

#[tokio::test]
async fn me_without_session_is_not_logged_in() {
    let app = TestApp::new();
    let author = app.create_user("alice").await;
    let tid = app.create_tuit(&author, "hi").await;

    let requests = [
        (Method::GET, "/api/users/me".to_string()),
        (Method::DELETE, "/api/users/me".to_string()),
        (Method::GET, "/api/users/me/tuits".to_string()),
        (Method::PUT, format!("/api/users/me/likes/{}", tid)),
        (Method::PUT, format!("/api/users/me/dislikes/{}", tid)),
        (Method::POST, format!("/api/users/me/bookmarks/{}", tid)),
        (Method::GET, "/api/users/me/likes".to_string()),
        (Method::POST, format!("/api/users/me/follows/{}", author)),
        (Method::GET, "/api/users/me/followers".to_string()),
        (Method::GET, "/api/users/me/messages/sent".to_string()),
    ];

    for (method, uri) in requests {
        let reply = app.send(method.clone(), &uri, None, None).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(reply.error(), "No user is logged in.", "{} {}", method, uri);
    }
    assert_eq!(app.get("/api/users").await.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn me_resolves_to_session_user() {
    let app = TestApp::new();
    let (uid, cookie) = app.signup("alice", "pw").await;

    let posted = app
        .send(
            Method::POST,
            "/api/users/me/tuits",
            Some(json!({ "tuit": "posted as me" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(posted.status, StatusCode::OK);
    assert_eq!(posted.body["postedBy"]["_id"], uid.as_str());
    let tid = posted.body["_id"].as_str().unwrap().to_string();

    let liked = app
        .send(Method::PUT, &format!("/api/users/me/likes/{}", tid), None, Some(&cookie))
        .await;
    assert_eq!(liked.body["stats"]["likes"], 1);

    let mine = app.get(&format!("/api/users/{}/likes", uid)).await;
    assert_eq!(mine.body[0]["_id"], tid.as_str());
}

#[tokio::test]
async fn blank_tuit_is_rejected() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;

    let reply = app
        .send(
            Method::POST,
            &format!("/api/users/{}/tuits", uid),
            Some(json!({ "tuit": "   " })),
            None,
        )
        .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.error(), "Empty tuit content");
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let app = TestApp::new();

    let reply = app
        .send(Method::POST, "/api/auth/login", Some(json!({ "username": 7 })), None)
        .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert!(!reply.error().is_empty());
}

#[tokio::test]
async fn users_never_expose_hashes() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;

    for user in app.get("/api/users").await.body.as_array().unwrap() {
        assert_eq!(user["password"], "");
    }
    assert_eq!(app.get(&format!("/api/users/{}", uid)).await.body["password"], "");
    assert_eq!(app.get("/api/users/username/alice").await.body["_id"], uid.as_str());
}

#[tokio::test]
async fn renaming_to_taken_username_names_the_field() {
    let app = TestApp::new();
    app.create_user("alice").await;
    let bob = app.create_user("bob").await;

    let reply = app
        .send(
            Method::PUT,
            &format!("/api/users/{}", bob),
            Some(json!({ "username": "alice" })),
            None,
        )
        .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.error(), "username: alice already exists.");
}

#[tokio::test]
async fn deleting_user_removes_their_tuits() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;
    let tid = app.create_tuit(&uid, "soon gone").await;

    let deleted = app.send(Method::DELETE, &format!("/api/users/{}", uid), None, None).await;
    assert_eq!(deleted.body, json!({ "deletedCount": 1 }));

    assert_eq!(app.get(&format!("/api/tuits/{}", tid)).await.status, StatusCode::NOT_FOUND);
    let again = app.send(Method::DELETE, "/api/users/username/alice", None, None).await;
    assert_eq!(again.body, json!({ "deletedCount": 0 }));
}

#[tokio::test]
async fn follow_and_unfollow() {
    let app = TestApp::new();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let uri = format!("/api/users/{}/follows/{}", alice, bob);

    let followed = app.send(Method::POST, &uri, None, None).await;
    assert_eq!(followed.status, StatusCode::OK);
    assert_eq!(followed.body["userFollowed"], bob.as_str());
    app.send(Method::POST, &uri, None, None).await;

    assert_eq!(app.get("/api/follows").await.body.as_array().unwrap().len(), 1);
    assert_eq!(app.get(&format!("/api/users/{}/following", alice)).await.body[0]["_id"], bob.as_str());
    assert_eq!(app.get(&format!("/api/users/{}/followers", bob)).await.body[0]["_id"], alice.as_str());

    let unfollowed = app.send(Method::DELETE, &uri, None, None).await;
    assert_eq!(unfollowed.body, json!({ "deletedCount": 1 }));
    assert_eq!(app.get(&uri).await.body, json!(null));

    let ghost = app
        .send(Method::POST, &format!("/api/users/{}/follows/ghost", alice), None, None)
        .await;
    assert_eq!(ghost.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messages_flow_between_users() {
    let app = TestApp::new();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;

    let sent = app
        .send(
            Method::POST,
            &format!("/api/users/{}/messages/to/{}", alice, bob),
            Some(json!({ "message": "hi bob" })),
            None,
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    let mid = sent.body["_id"].as_str().unwrap().to_string();

    let outbox = app.get(&format!("/api/users/{}/messages/sent", alice)).await;
    assert_eq!(outbox.body[0]["message"], "hi bob");
    let inbox = app.get(&format!("/api/users/{}/messages/received", bob)).await;
    assert_eq!(inbox.body[0]["from"], alice.as_str());

    let deleted = app.send(Method::DELETE, &format!("/api/messages/{}", mid), None, None).await;
    assert_eq!(deleted.body, json!({ "deletedCount": 1 }));
    let again = app.send(Method::DELETE, &format!("/api/messages/{}", mid), None, None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_user_sends_and_lists_messages_via_me() {
    let app = TestApp::new();
    let (alice, cookie) = app.signup("alice", "pw").await;
    let bob = app.create_user("bob").await;

    let sent = app
        .send(
            Method::POST,
            &format!("/api/users/me/messages/to/{}", bob),
            Some(json!({ "message": "from me" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK, "{}", sent.body);
    assert_eq!(sent.body["from"], alice.as_str());
    assert_eq!(sent.body["to"], bob.as_str());

    let outbox = app
        .send(Method::GET, "/api/users/me/messages/sent", None, Some(&cookie))
        .await;
    assert_eq!(outbox.status, StatusCode::OK);
    assert_eq!(outbox.body[0]["message"], "from me");

    // The listing paths are not send targets
    let misrouted = app
        .send(
            Method::POST,
            "/api/users/me/messages/sent",
            Some(json!({ "message": "lost" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(misrouted.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn metrics_count_relation_writes() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;
    let tid = app.create_tuit(&uid, "measured").await;
    app.send(Method::PUT, &format!("/api/users/{}/likes/{}", uid, tid), None, None)
        .await;

    let (status, body) = app.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("tuiter_relation_writes_total{outcome=\"added\",relation=\"like\"} 1"));
}
