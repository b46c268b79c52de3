//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary upload
//! root, and a full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use mp_core::config::Config;
use mp_db::pool::{init_memory_pool, DbPool};
use mp_server::context::AppContext;
use mp_server::router::build_router;
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a temporary upload directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    /// Keeps the upload root alive for the lifetime of the harness.
    pub upload_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. The upload root is
    /// always replaced by a fresh temporary directory.
    pub fn with_config(mut config: Config) -> Self {
        let upload_dir = tempfile::tempdir().expect("failed to create upload dir");
        config.uploads.root = upload_dir.path().to_path_buf();

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), config);

        Self { ctx, db, upload_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> mp_db::pool::PooledConnection {
        mp_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Path of a file under the upload root.
    pub fn upload_path(&self, name: &str) -> std::path::PathBuf {
        self.upload_dir.path().join(name)
    }

    /// Insert a manga directly through the storage layer.
    pub fn create_manga(&self, title: &str) -> mp_core::MangaId {
        mp_db::queries::mangas::create_manga(&self.conn(), title, None, None)
            .expect("failed to create manga")
            .id
    }
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}

/// A multipart file part with the given client filename.
pub fn file_part(name: &str, bytes: &[u8]) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(name.to_string())
}

/// Multipart form that sends filenames verbatim, as browsers do.
pub fn multipart_form() -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().percent_encode_noop()
}
