//! Application context shared across route handlers via Axum state.
//!
//! [`AppContext`] replaces any global registry: every handler receives the
//! database pool, configuration, and upload store explicitly.

use std::sync::Arc;

use mp_core::config::Config;
use mp_db::pool::DbPool;

use crate::uploads::UploadStore;

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppContext {
    /// SQLite connection pool.
    pub db: DbPool,
    /// Application configuration as loaded at startup.
    pub config: Arc<Config>,
    /// Upload root writer and resolver.
    pub uploads: Arc<UploadStore>,
}

impl AppContext {
    pub fn new(db: DbPool, config: Config) -> Self {
        let uploads = Arc::new(UploadStore::from_config(&config.uploads));
        Self {
            db,
            config: Arc::new(config),
            uploads,
        }
    }
}
