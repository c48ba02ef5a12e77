//! Rate limiter server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratelimit_cache::RedisCounterStore;
use ratelimit_core::AppConfig;
use ratelimit_database::{DatabasePool, PgUserStore, PoolConfig};
use ratelimit_server::{AppState, Metrics};

/// Rate limiter HTTP server.
#[derive(Parser, Debug)]
#[command(name = "ratelimit-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind to (overrides the PORT environment variable)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides the HOST environment variable)
    #[arg(long)]
    host: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratelimit=info,tower_http=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    let db_pool = match DatabasePool::connect(&config.supabase, PoolConfig::default()).await {
        Ok(pool) => pool,
        Err(err) => {
            error!(error = %err, "failed to connect to the user store");
            std::process::exit(1);
        }
    };
    if let Err(err) = db_pool.ready_check().await {
        error!(error = %err, "user store readiness check failed");
        std::process::exit(1);
    }

    let counter_store = match RedisCounterStore::new(&config.redis.connection_url()) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            error!(error = %err, "failed to construct the counter store");
            std::process::exit(1);
        }
    };
    if let Err(err) = counter_store.ready_check().await {
        error!(error = %err, "counter store readiness check failed");
        std::process::exit(1);
    }

    let user_store = Arc::new(PgUserStore::new(db_pool.pg_pool().clone()));

    let address: SocketAddr = match config.server.address().parse() {
        Ok(address) => address,
        Err(err) => {
            error!(error = %err, "invalid server address");
            std::process::exit(1);
        }
    };

    let app_state = match AppState::builder()
        .config(config)
        .user_store(user_store.clone())
        .override_writer(user_store)
        .counter_store(counter_store)
        .metrics(Arc::new(Metrics::new()))
        .build()
    {
        Ok(state) => state,
        Err(err) => {
            error!(error = %err, "failed to assemble application state");
            std::process::exit(1);
        }
    };

    let router = ratelimit_server::create_router(app_state);

    info!(%address, "starting rate limiter server");

    let listener = match tokio::net::TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, %address, "failed to bind listening socket");
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!(error = %err, "server exited with an error");
        std::process::exit(1);
    }
}

/// Waits for SIGINT (Ctrl+C) or, on Unix, SIGTERM. Any error while
/// draining in-flight requests during the subsequent shutdown is logged,
/// never surfaced to the caller.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
