use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watchgate_api::config::ServerConfig;
use watchgate_api::router::build_app_router;
use watchgate_api::state::AppState;
use watchgate_engine::{PgRansomStore, RansomStore};
use watchgate_plex::{MediaServer, PlexApi, Unconfigured};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = watchgate_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    watchgate_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    watchgate_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Media server ---
    let media: Arc<dyn MediaServer> = match &config.plex {
        Some(plex) => {
            let api = PlexApi::new(plex).expect("Failed to build media server client");
            tracing::info!(url = %plex.base_url, "Media server configured");
            Arc::new(api)
        }
        None => {
            tracing::warn!("PLEX_URL/PLEX_TOKEN not set; sessions will not be terminated");
            Arc::new(Unconfigured)
        }
    };

    // --- App state ---
    let store: Arc<dyn RansomStore> = Arc::new(PgRansomStore::new(pool.clone()));
    let state = AppState::new(pool, config.clone(), store, media);

    let webhook_tasks = state.webhook_tasks.clone();
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Let enforcement already handed off by the webhook finish.
    webhook_tasks.close();
    tracing::info!(pending = webhook_tasks.len(), "Waiting for webhook processing to drain");
    webhook_tasks.wait().await;

    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` selects JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "watchgate_api=debug,watchgate_engine=debug,watchgate_plex=info,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
