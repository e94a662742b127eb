// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::table;
use diesel::joinable;
use diesel::allow_tables_to_appear_in_same_query;

table! {
    users (id) {
        id -> Varchar,
        username -> Varchar,
        password -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        profile_photo -> Nullable<Varchar>,
        header_image -> Nullable<Varchar>,
        account_type -> Varchar,
        marital_status -> Varchar,
        biography -> Nullable<Text>,
        date_of_birth -> Nullable<Date>,
        joined -> Timestamptz,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
    }
}

table! {
    tuits (id) {
        id -> Varchar,
        tuit -> Text,
        posted_by -> Varchar,
        posted_on -> Timestamptz,
        likes -> BigInt,
        dislikes -> BigInt,
    }
}

// Likes, dislikes and bookmarks, told apart by `kind`
table! {
    tuit_relations (kind, user_id, tuit_id) {
        kind -> Varchar,
        user_id -> Varchar,
        tuit_id -> Varchar,
        created_at -> Timestamptz,
    }
}

table! {
    follows (user_following, user_followed) {
        user_following -> Varchar,
        user_followed -> Varchar,
        followed_on -> Timestamptz,
    }
}

table! {
    messages (id) {
        id -> Varchar,
        message -> Text,
        sent_from -> Varchar,
        sent_to -> Varchar,
        sent_on -> Timestamptz,
    }
}

joinable!(tuits -> users (posted_by));

allow_tables_to_appear_in_same_query!(
    users,
    tuits,
    tuit_relations,
    follows,
    messages,
);
