pub mod api;
pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod services;
pub mod session;
