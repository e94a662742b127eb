// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::relations::{self, Bookmarks, Dislikes, Likes, Relation};
use super::handlers::{auth, follows, health, messages, metrics, tuits, users};
use super::AppState;

/// Every route of the service, bound to `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        // General routes
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::get_metrics))

        // User routes
        .route("/api/users", get(users::find_all_users).post(users::create_user))
        .route(
            "/api/users/:uid",
            get(users::find_user_by_id)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/users/username/:uname",
            get(users::find_user_by_username).delete(users::delete_user_by_username),
        )

        // Tuit routes
        .route("/api/tuits", get(tuits::find_all_tuits))
        .route(
            "/api/tuits/:tid",
            get(tuits::find_tuit_by_id)
                .put(tuits::update_tuit)
                .delete(tuits::delete_tuit),
        )
        .route(
            "/api/users/:uid/tuits",
            get(tuits::find_tuits_by_user).post(tuits::create_tuit),
        )

        // Like, dislike and bookmark routes
        .merge(relation_routes::<Likes>())
        .merge(relation_routes::<Dislikes>())
        .merge(relation_routes::<Bookmarks>())

        // Follow routes
        .route(
            "/api/users/:uid/follows/:other",
            post(follows::follow_user)
                .delete(follows::unfollow_user)
                .get(follows::find_follow),
        )
        .route("/api/users/:uid/following", get(follows::find_following))
        .route("/api/users/:uid/followers", get(follows::find_followers))
        .route("/api/follows", get(follows::find_all_follows))

        // Message routes
        .route("/api/users/:uid/messages/to/:other", post(messages::send_message))
        .route("/api/users/:uid/messages/sent", get(messages::find_sent_messages))
        .route("/api/users/:uid/messages/received", get(messages::find_received_messages))
        .route("/api/messages/:mid", delete(messages::delete_message))

        // Auth routes
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/profile", get(auth::profile))

        .with_state(state)
}

/// The same seven routes for each relation kind, e.g. `/api/users/:uid/likes/:tid`
fn relation_routes<R: Relation>() -> Router<AppState> {
    let plural = R::KIND.plural();

    Router::new()
        .route(
            &format!("/api/users/:uid/{}/:tid", plural),
            post(relations::set::<R>)
                .delete(relations::clear::<R>)
                .put(relations::toggle::<R>)
                .get(relations::find_one::<R>),
        )
        .route(
            &format!("/api/users/:uid/{}", plural),
            get(relations::find_tuits_by_user::<R>),
        )
        .route(
            &format!("/api/tuits/{}/:tid", plural),
            get(relations::find_users_by_tuit::<R>),
        )
        .route(&format!("/api/{}", plural), get(relations::find_all::<R>))
}
