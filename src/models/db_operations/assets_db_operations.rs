use crate::catalog::dates::{parse_storage_timestamp, storage_timestamp};
use crate::models::Asset;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Error as RusqliteError, OptionalExtension, Row};

fn row_to_asset(row: &Row) -> rusqlite::Result<Asset> {
    let uploaded_at: String = row.get(7)?;
    Ok(Asset {
        id: row.get(0)?,
        filename: row.get(1)?,
        url: row.get(2)?,
        alt_text: row.get(3)?,
        title: row.get(4)?,
        file_format: row.get(5)?,
        file_size: row.get(6)?,
        uploaded_at: parse_storage_timestamp(&uploaded_at).ok_or_else(|| {
            RusqliteError::FromSqlConversionFailure(7, Type::Text, format!("bad timestamp '{}'", uploaded_at).into())
        })?,
    })
}

pub fn add_asset(conn: &Connection, asset: &Asset) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT INTO assets (id, filename, url, alt_text, title, file_format, file_size, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            asset.id,
            asset.filename,
            asset.url,
            asset.alt_text,
            asset.title,
            asset.file_format,
            asset.file_size,
            storage_timestamp(asset.uploaded_at),
        ],
    )?;
    Ok(())
}

pub fn read_asset(conn: &Connection, id: &str) -> Result<Option<Asset>, RusqliteError> {
    conn.query_row(
        "SELECT id, filename, url, alt_text, title, file_format, file_size, uploaded_at FROM assets WHERE id = ?1",
        [id],
        row_to_asset,
    )
    .optional()
}

/// Newest first.
pub fn list_assets(conn: &Connection, limit: u32, offset: u32) -> Result<Vec<Asset>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT id, filename, url, alt_text, title, file_format, file_size, uploaded_at
         FROM assets ORDER BY uploaded_at DESC, rowid DESC LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt.query_map(params![limit, offset], row_to_asset)?;

    let mut assets = Vec::new();
    for asset in rows {
        assets.push(asset?);
    }
    Ok(assets)
}

pub fn update_asset_metadata(conn: &Connection, id: &str, alt_text: &str, title: &str) -> Result<bool, RusqliteError> {
    let changed = conn.execute(
        "UPDATE assets SET alt_text = ?1, title = ?2 WHERE id = ?3",
        params![alt_text, title, id],
    )?;
    Ok(changed > 0)
}

pub fn delete_asset(conn: &Connection, id: &str) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM assets WHERE id = ?1", [id])
}
