//! Lingo Server
//!
//! Content-management backend for language-learning exercises with
//! versioned cache/search synchronization and client delta sync.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingo_server::cache::MemoryCache;
use lingo_server::config::Config;
use lingo_server::routes;
use lingo_server::search::SearchIndex;
use lingo_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lingo_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Lingo Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.database.url);

    // Initialize database and search index
    let db_pool = lingo_server::db::create_pool(&config.database.url)
        .await
        .expect("Failed to initialize database");
    SearchIndex::new(&db_pool)
        .initialize()
        .await
        .expect("Failed to initialize search index");

    // Create application state with the in-process detail cache
    let cache = Arc::new(MemoryCache::new());
    let app_state = AppState::new(config.clone(), db_pool, cache.clone());

    // Background outbox drainer: retries cache/search syncs that the
    // request path could not apply
    {
        let syncer = app_state.syncer().clone();
        let interval = Duration::from_secs(config.sync.drain_interval_secs);
        let batch = config.sync.drain_batch_size;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match syncer.drain_outbox(batch).await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Outbox drain applied {} entries", n),
                    Err(e) => tracing::warn!("Outbox drain failed: {}", e),
                }
            }
        });
    }

    // Background cache sweeper
    {
        let sweep_interval = Duration::from_secs(config.cache.sweep_interval_secs);
        let cache = cache.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                let removed = cache.sweep().await;
                if removed > 0 {
                    tracing::debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        });
    }

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Lingo Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
