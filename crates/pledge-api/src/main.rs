//! pledge-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pledge_api::{router, AppState, NoteService, ServerConfig, StorageBackend};
use pledge_core::{NoteRepository, PublishedScorer};
use pledge_db::{Database, MemoryNoteRepository, PoolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "pledge_api=debug,pledge_db=info,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pledge_api=debug,pledge_db=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("pledge-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files by default
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env();
    info!(
        storage = %config.storage_backend,
        algorithm_version = %config.algorithm_version,
        rate_limit_enabled = config.rate_limit_enabled,
        "Configuration loaded"
    );

    // Storage
    let (repo, db): (Arc<dyn NoteRepository>, Option<Database>) = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool_config = PoolConfig::new().max_connections(config.db_max_connections);
            let db = Database::connect_with_config(&config.database_url, pool_config).await?;
            if config.migrate_on_startup {
                db.migrate().await?;
                info!(subsystem = "db", op = "migrate", "Migrations applied");
            }
            (Arc::new(db.notes.clone()), Some(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; notes are lost on restart");
            (Arc::new(MemoryNoteRepository::new()), None)
        }
    };

    let scorer = Arc::new(PublishedScorer::new(config.algorithm_version.clone()));
    let state = AppState {
        notes: NoteService::new(repo, scorer),
        db,
        storage: config.storage_backend,
        rate_limiter: config.rate_limiter(),
    };

    let app = router(state, config.allowed_origins());

    // Start server
    let addr: SocketAddr = config.bind_addr().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
