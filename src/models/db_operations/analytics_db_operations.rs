use crate::catalog::dates::storage_timestamp;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Error as RusqliteError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyLeadCount {
    pub property_id: String,
    pub title: String,
    pub leads: i64,
}

pub fn count_properties_by_activity(conn: &Connection) -> Result<(i64, i64), RusqliteError> {
    conn.query_row(
        "SELECT COALESCE(SUM(is_active = 1), 0), COALESCE(SUM(is_active = 0), 0) FROM properties",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}

fn grouped_counts(conn: &Connection, sql: &str) -> Result<Vec<LabelCount>, RusqliteError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok(LabelCount { label: row.get(0)?, count: row.get(1)? }))?;
    rows.collect()
}

pub fn count_active_by_city(conn: &Connection) -> Result<Vec<LabelCount>, RusqliteError> {
    grouped_counts(
        conn,
        "SELECT city, COUNT(*) FROM properties WHERE is_active = 1 GROUP BY city ORDER BY COUNT(*) DESC, city",
    )
}

pub fn count_active_by_modality(conn: &Connection) -> Result<Vec<LabelCount>, RusqliteError> {
    grouped_counts(
        conn,
        "SELECT auction_type, COUNT(*) FROM properties WHERE is_active = 1 GROUP BY auction_type ORDER BY auction_type",
    )
}

pub fn count_leads_since(conn: &Connection, since: DateTime<Utc>) -> Result<i64, RusqliteError> {
    conn.query_row(
        "SELECT COUNT(*) FROM leads WHERE created_at >= ?1",
        [storage_timestamp(since)],
        |row| row.get(0),
    )
}

pub fn top_properties_by_leads(conn: &Connection, limit: u32) -> Result<Vec<PropertyLeadCount>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.title, COUNT(l.id) AS lead_count
         FROM properties p JOIN leads l ON l.property_id = p.id
         GROUP BY p.id, p.title
         ORDER BY lead_count DESC, p.title ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok(PropertyLeadCount { property_id: row.get(0)?, title: row.get(1)?, leads: row.get(2)? })
    })?;
    rows.collect()
}
