use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::cms::locks::BlockLocks;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Process-wide state shared by every worker.
pub struct AppState {
    pub block_locks: BlockLocks,
    pub catalog_page_size: u32,
}

impl AppState {
    pub fn new(catalog_page_size: u32) -> Self {
        Self {
            block_locks: BlockLocks::default(),
            catalog_page_size,
        }
    }
}

pub mod catalog;
pub mod cms;
pub mod config;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
