use crate::catalog::dates::{parse_storage_timestamp, storage_timestamp};
use crate::models::{Channel, Lead};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Error as RusqliteError, Row};

fn row_to_lead(row: &Row) -> rusqlite::Result<Lead> {
    let created_at: String = row.get(6)?;
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        property_id: row.get(5)?,
        created_at: parse_storage_timestamp(&created_at).ok_or_else(|| {
            RusqliteError::FromSqlConversionFailure(6, Type::Text, format!("bad timestamp '{}'", created_at).into())
        })?,
    })
}

/// Inserts an already validated lead and returns its row id.
pub fn add_lead(
    conn: &Connection,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    message: &str,
    property_id: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<i64, RusqliteError> {
    conn.execute(
        "INSERT INTO leads (name, email, phone, message, property_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![name, email, phone, message, property_id, storage_timestamp(created_at)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Newest first, optionally only the leads about one property.
pub fn list_leads(
    conn: &Connection,
    property_id: Option<&str>,
    limit: u32,
    offset: u32,
) -> Result<Vec<Lead>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, message, property_id, created_at FROM leads
         WHERE (?1 IS NULL OR property_id = ?1)
         ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
    )?;
    let rows = stmt.query_map(params![property_id, limit, offset], row_to_lead)?;

    let mut leads = Vec::new();
    for lead in rows {
        leads.push(lead?);
    }
    Ok(leads)
}

/// Distinct addresses the leads left for a channel.
pub fn list_lead_contacts(conn: &Connection, channel: Channel, property_id: Option<&str>) -> Result<Vec<String>, RusqliteError> {
    let column = match channel {
        Channel::Email => "email",
        Channel::Whatsapp => "phone",
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT {col} FROM leads WHERE {col} IS NOT NULL AND {col} <> ''
         AND (?1 IS NULL OR property_id = ?1) ORDER BY {col}",
        col = column
    ))?;
    let rows = stmt.query_map(params![property_id], |row| row.get(0))?;
    rows.collect()
}
