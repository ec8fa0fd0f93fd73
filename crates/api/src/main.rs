use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hearth_api::config::ServerConfig;
use hearth_api::sms_gateway::{HttpSmsGateway, LogOnlyGateway, SmsGateway};
use hearth_api::state::AppState;
use hearth_api::storage::{LocalStore, MediaStore, SupabaseStore};
use hearth_api::{bootstrap, router};

const SESSION_RETENTION_DAYS: i64 = 30;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = hearth_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    hearth_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    hearth_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    bootstrap::ensure_admin(&pool, config.bootstrap_admin.as_ref())
        .await
        .expect("Failed to bootstrap admin account");

    // Ended sessions are kept a while so revocations can be audited.
    let cutoff = chrono::Utc::now() - chrono::Duration::days(SESSION_RETENTION_DAYS);
    match hearth_db::repositories::SessionRepo::purge_ended_before(&pool, cutoff).await {
        Ok(purged) => tracing::info!(purged, "Purged ended staff sessions"),
        Err(e) => tracing::warn!(error = %e, "Failed to purge ended staff sessions"),
    }

    // --- External services ---
    let media_store: Arc<dyn MediaStore> = match config.storage.supabase() {
        Some((url, key)) => {
            tracing::info!(bucket = %config.storage.bucket, "Using Supabase storage");
            Arc::new(SupabaseStore::new(url, key, &config.storage.bucket))
        }
        None => {
            tracing::info!(dir = %config.storage.local_dir, "Using local media storage");
            Arc::new(LocalStore::new(&config.storage.local_dir))
        }
    };

    let sms_gateway: Arc<dyn SmsGateway> = match &config.sms.endpoint_url {
        Some(url) => Arc::new(HttpSmsGateway::new(
            url,
            config.sms.api_key.as_deref(),
            &config.sms.from_number,
        )),
        None => {
            tracing::warn!("SMS_ENDPOINT_URL not set; outbound messages will only be logged");
            Arc::new(LogOnlyGateway::new(&config.sms.from_number))
        }
    };

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        media_store,
        sms_gateway,
    };

    let app = router::build_app_router(state, &config);

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

    tracing::info!("Server stopped accepting connections, closing database pool");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, pool.close()).await.is_err() {
        tracing::warn!(secs = config.shutdown_timeout_secs, "Database pool did not close in time");
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
