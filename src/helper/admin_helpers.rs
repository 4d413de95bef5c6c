use crate::models::db_operations::analytics_db_operations::{self, LabelCount, PropertyLeadCount};
use crate::models::db_operations::blocks_db_operations::{self, BlockStoreError};
use crate::models::db_operations::users_db_operations;
use crate::models::{AdminUser, CmsBlockSummary};
use crate::DbPool;
use chrono::{Duration, Utc};
use redb::Database;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_MAX_UPLOAD_MB: u64 = 10;
pub const MAX_UPLOAD_MB_LIMIT: u64 = 2_048;
const TOP_PROPERTIES: u32 = 5;
const RECENT_LEAD_DAYS: i64 = 30;

#[derive(Error, Debug)]
pub enum AdminHelperError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Content store error: {0}")]
    BlockStore(#[from] BlockStoreError),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

#[derive(Serialize)]
pub struct Settings {
    pub max_file_upload_size_mb: String,
    pub allowed_mime_types: String,
}

impl Settings {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_file_upload_size_mb
            .trim()
            .parse::<u64>()
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB)
            .saturating_mul(1024 * 1024)
    }

    pub fn allowed_mime_list(&self) -> Vec<String> {
        self.allowed_mime_types
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub active_properties: i64,
    pub inactive_properties: i64,
    pub properties_by_city: Vec<LabelCount>,
    pub properties_by_modality: Vec<LabelCount>,
    pub leads_last_30_days: i64,
    pub top_properties_by_leads: Vec<PropertyLeadCount>,
    pub unpublished_blocks: Vec<CmsBlockSummary>,
}

fn get_conn(pool: &DbPool) -> Result<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>, AdminHelperError> {
    pool.get().map_err(AdminHelperError::Pool)
}

pub fn get_settings(conn: &Connection) -> Settings {
    let max_size = users_db_operations::read_setting(conn, "max_file_upload_size_mb")
        .unwrap_or_else(|| DEFAULT_MAX_UPLOAD_MB.to_string());

    let mime_types = users_db_operations::read_setting(conn, "allowed_mime_types")
        .unwrap_or_else(|| "".to_string());

    Settings {
        max_file_upload_size_mb: max_size,
        allowed_mime_types: mime_types,
    }
}

pub fn fetch_settings(pool: &DbPool) -> Result<Settings, AdminHelperError> {
    let conn = get_conn(pool)?;
    Ok(get_settings(&conn))
}

pub fn update_setting(pool: &DbPool, key: &str, value: &str) -> Result<(), AdminHelperError> {
    let conn = get_conn(pool)?;
    users_db_operations::update_setting(&conn, key, value)?;
    Ok(())
}

pub fn fetch_admins(pool: &DbPool) -> Result<Vec<AdminUser>, AdminHelperError> {
    let conn = get_conn(pool)?;
    Ok(users_db_operations::read_all_admins(&conn)?)
}

pub fn record_login(pool: &DbPool, username: &str) -> Result<(), AdminHelperError> {
    let conn = get_conn(pool)?;
    users_db_operations::update_last_login_time(&conn, username)?;
    Ok(())
}

pub fn collect_dashboard_stats(pool: &DbPool, db: &Database) -> Result<DashboardStats, AdminHelperError> {
    let conn = get_conn(pool)?;
    let (active_properties, inactive_properties) = analytics_db_operations::count_properties_by_activity(&conn)?;
    let since = Utc::now() - Duration::days(RECENT_LEAD_DAYS);

    let unpublished_blocks = blocks_db_operations::list_all_blocks(db)?
        .iter()
        .filter(|block| !block.is_published())
        .map(CmsBlockSummary::from)
        .collect();

    Ok(DashboardStats {
        active_properties,
        inactive_properties,
        properties_by_city: analytics_db_operations::count_active_by_city(&conn)?,
        properties_by_modality: analytics_db_operations::count_active_by_modality(&conn)?,
        leads_last_30_days: analytics_db_operations::count_leads_since(&conn, since)?,
        top_properties_by_leads: analytics_db_operations::top_properties_by_leads(&conn, TOP_PROPERTIES)?,
        unpublished_blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_with_fallbacks() {
        let settings = Settings {
            max_file_upload_size_mb: "abc".into(),
            allowed_mime_types: " image/PNG, ,application/pdf".into(),
        };
        assert_eq!(settings.max_upload_bytes(), DEFAULT_MAX_UPLOAD_MB * 1024 * 1024);
        assert_eq!(settings.allowed_mime_list(), vec!["image/png".to_string(), "application/pdf".to_string()]);
    }

    #[test]
    fn huge_upload_size_saturates() {
        let settings = Settings {
            max_file_upload_size_mb: "18000000000000".into(),
            allowed_mime_types: String::new(),
        };
        assert_eq!(settings.max_upload_bytes(), u64::MAX);
    }
}
