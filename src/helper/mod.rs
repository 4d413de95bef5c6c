use crate::DbPool;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use thiserror::Error;

pub mod admin_helpers;
pub mod asset_helpers;
pub mod cms_helpers;
pub mod lead_helpers;
pub mod marketing_helpers;
pub mod property_helpers;
pub mod public_helpers;
pub mod sanitization_helpers;

/// Failures of the SQLite-backed site data helpers.
#[derive(Error, Debug)]
pub enum SiteDbError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

pub fn get_conn(pool: &DbPool) -> Result<PooledConnection<SqliteConnectionManager>, SiteDbError> {
    pool.get().map_err(SiteDbError::Pool)
}
