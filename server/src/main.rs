use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod store;
mod validator;

use config::AppConfig;
use store::LinkStore;
use validator::{HostResolver, SystemResolver, UrlValidator};

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: AppConfig,
    pub store: LinkStore,
    pub validator: UrlValidator,
}

impl AppState {
    pub fn new(config: AppConfig, resolver: Arc<dyn HostResolver>) -> Self {
        let validator = UrlValidator::new(resolver, config.lookup_timeout);
        Self {
            config,
            store: LinkStore::new(),
            validator,
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let index_page = ServeFile::new(&state.config.index_page);
    let public_dir = ServeDir::new(&state.config.public_dir);

    Router::new()
        // Landing page and its assets
        .route_service("/", index_page)
        .nest_service("/public", public_dir)
        // Platform health check
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/api/shorturl", post(handlers::shorturl::create))
        .route("/api/shorturl/:id", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent; env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shorturl=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    tracing::info!("Starting shorturl on {}", config.bind_addr());
    tracing::info!(
        "Hostname lookups time out after {:?}; error statuses: {:?}",
        config.lookup_timeout,
        config.status_policy
    );

    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, Arc::new(SystemResolver)));
    let app = router(state.clone());

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(
        "Server stopped with {} short url(s) registered",
        state.store.len().await
    );
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
