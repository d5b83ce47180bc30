//! Booking Cache - TTL cache and rate limiter service
//!
//! Serves the cache facade and rate limiter over HTTP, backed by Redis or
//! by an in-process store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booking_cache::api::create_router;
use booking_cache::config::StoreBackend;
use booking_cache::store::KeyValueStore;
use booking_cache::{
    spawn_sweeper, AppState, CacheFacade, Config, MemoryStore, RateLimiter, RedisStore,
};

/// Main entry point for the booking cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache and session stores for the configured backend
/// 4. Connect eagerly, continuing in degraded mode if the store is down
/// 5. Start the HTTP server on the configured port
/// 6. On SIGINT/SIGTERM, stop sweepers and disconnect the stores
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, store={}:{} (db {}, sessions db {}), port={}",
        config.backend,
        config.redis_host,
        config.redis_port,
        config.redis_db,
        config.redis_session_db,
        config.server_port
    );

    let (state, sweepers) = build_state(&config)?;

    if let Err(e) = state.cache.connect().await {
        warn!("Store unreachable at startup, serving in degraded mode: {}", e);
    }

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    for handle in sweepers {
        handle.abort();
    }
    if let Err(e) = state.cache.disconnect().await {
        warn!("Failed to disconnect stores cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Builds application state for the configured backend.
///
/// Returns the sweeper handles to abort on shutdown (memory backend only).
fn build_state(config: &Config) -> anyhow::Result<(AppState, Vec<JoinHandle<()>>)> {
    let policy = config.rate_limit_policy();

    match config.backend {
        StoreBackend::Redis => {
            let store: Arc<dyn KeyValueStore> = Arc::new(
                RedisStore::new(config.cache_store()).context("invalid cache store settings")?,
            );
            let sessions: Arc<dyn KeyValueStore> = Arc::new(
                RedisStore::new(config.session_store())
                    .context("invalid session store settings")?,
            );

            let cache = CacheFacade::new(store.clone(), sessions, config.ttls.clone());
            Ok((
                AppState::new(cache, RateLimiter::new(store), policy),
                Vec::new(),
            ))
        }
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            let sessions = Arc::new(MemoryStore::new());
            let sweepers = vec![
                spawn_sweeper(store.clone(), config.sweep_interval),
                spawn_sweeper(sessions.clone(), config.sweep_interval),
            ];

            let cache = CacheFacade::new(store.clone(), sessions, config.ttls.clone());
            Ok((
                AppState::new(cache, RateLimiter::new(store), policy),
                sweepers,
            ))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
