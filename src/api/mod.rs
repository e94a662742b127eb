// Copyright (c) Tuiter Team
// SPDX-License-Identifier: Apache-2.0

pub mod extract;
mod handlers;
mod routes;

use crate::config::{Config, ServerConfig};
use crate::dao::Store;
use crate::metrics::Metrics;
use crate::session::SessionStore;
use anyhow::Result;
use axum::http::HeaderValue;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use routes::router;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionStore>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Result<Self> {
        Ok(Self {
            store,
            sessions: Arc::new(SessionStore::new(&config.session)?),
            metrics: Arc::new(Metrics::new()?),
        })
    }
}

/// Router with tracing and CORS applied
pub fn app(state: AppState, config: &ServerConfig) -> Result<axum::Router> {
    // Cookies only travel cross-origin with credentials, which rules out `*`
    let cors = match &config.cors_allowed_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin.parse::<HeaderValue>()?))
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request()),
        None => CorsLayer::permissive(),
    };

    Ok(router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// Serve the API until `shutdown` resolves
pub async fn start_api_server(
    state: AppState,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = app(state, config)?;

    // Get bind address
    let addr = format!("{}:{}", config.host, config.port).parse::<SocketAddr>()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Starting API server on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}
