//! mp-server: HTTP API, upload handling, and HTML views for mangapress.
//!
//! This crate ties the storage layer to the web. It provides:
//!
//! - Axum router with JSON endpoints, admin form endpoints, and the reader
//! - Upload store that validates, sanitizes, and writes page images
//! - Query/presentation service shaping rows for responses and pages
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod form;
pub mod render;
pub mod router;
pub mod routes;
pub mod service;
pub mod uploads;

use std::net::SocketAddr;

use mp_core::config::Config;

use crate::context::AppContext;

/// Start the mangapress server.
///
/// Initializes the database and upload root, builds the [`AppContext`], and
/// serves HTTP until a shutdown signal is received.
pub async fn start(config: Config) -> mp_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Initialize database.
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| mp_core::Error::filesystem(parent, e))?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = mp_db::pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| mp_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(db, config);
    ctx.uploads.ensure_root()?;
    tracing::info!(
        root = %ctx.uploads.root().display(),
        overwrite = ctx.config.uploads.overwrite,
        "Upload root ready"
    );

    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| mp_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| mp_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives.
///
/// A handler that fails to install is logged and never fires, leaving the
/// other one in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
