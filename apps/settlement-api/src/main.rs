//! # Stockroom Settlement API
//!
//! HTTP server wiring PostgreSQL and Redis into the settlement services.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Settlement API Server                              │
//! │                                                                         │
//! │  Client ───► HTTP (8080) ───► Services ───► PostgreSQL                 │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                                 Redis                                   │
//! │                     (events / cache / notify queue)                     │
//! │                                                                         │
//! │  Background: reconciliation sweep every RECONCILE_INTERVAL_SECS        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use settlement_api::config::ApiConfig;
use settlement_api::routes;
use settlement_api::state::AppState;
use stockroom_adapters::{RedisBus, RedisEventSink, RedisNotifier, RedisStockCache};
use stockroom_db::{Database, DbConfig};
use stockroom_settlement::{Ports, Reconciler, ReconcilerTask};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting Stockroom settlement API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        listing_ttl_secs = config.listing_ttl_secs,
        reconcile_interval_secs = config.reconcile_interval_secs,
        "Configuration loaded"
    );

    // Connect to database (runs migrations unless disabled)
    let db = Database::new(
        DbConfig::new(&config.database_url)
            .max_connections(config.db_max_connections)
            .run_migrations(config.run_migrations),
    )
    .await?;
    info!("Connected to PostgreSQL");

    // Connect to Redis. Startup needs the server reachable once; runtime
    // outages degrade per call through the op timeout instead of failing
    // settlements.
    let bus = RedisBus::connect(&config.redis_url)
        .await?
        .with_op_timeout(config.redis_op_timeout());

    // Wire the port bundle. One stock repository serves as both catalog
    // and ledger.
    let stocks = Arc::new(db.stocks());
    let ports = Ports {
        ledger: stocks.clone(),
        catalog: stocks,
        recorder: Arc::new(db.purchases()),
        payouts: Arc::new(db.payouts()),
        directory: Arc::new(db.admins()),
        events: Arc::new(RedisEventSink::new(bus.clone())),
        cache: Arc::new(RedisStockCache::new(bus.clone())),
        notifier: Arc::new(RedisNotifier::new(bus.clone())),
    };

    // Background reconciliation sweep
    let reconciler = Reconciler::with_grace(Arc::new(db.reconciliation()), config.reconcile_grace());
    let (task, reconciler_handle) = ReconcilerTask::new(reconciler, config.reconcile_interval());
    tokio::spawn(task.run());

    // Build shared state and routes
    let state = AppState::new(ports, config.listing_ttl())
        .with_database(db)
        .with_redis(bus);
    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(err) = reconciler_handle.shutdown().await {
        warn!(error = %err, "Reconciler already stopped");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// A handler that fails to install logs and parks instead of panicking;
/// the sibling signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install signal handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
