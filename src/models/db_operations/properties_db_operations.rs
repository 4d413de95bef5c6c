use crate::catalog::dates::{parse_storage_timestamp, storage_timestamp};
use crate::catalog::query::{Page, PropertyQuery};
use crate::models::{AuctionModality, Property, PropertyInput, PropertyType};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, Error as RusqliteError, OptionalExtension, Row};
use uuid::Uuid;

const PROPERTY_COLUMNS: &str = "id, title, description, property_type, city, neighborhood, address, area_m2, bedrooms, \
     first_auction_price, second_auction_price, appraisal_value, auction_type, first_auction_at, second_auction_at, \
     image_urls, notice_url, is_active, created_at, updated_at";

fn conversion_error(column: usize, message: String) -> RusqliteError {
    RusqliteError::FromSqlConversionFailure(column, Type::Text, message.into())
}

fn timestamp_column(row: &Row, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_storage_timestamp(&raw).ok_or_else(|| conversion_error(column, format!("bad timestamp '{}'", raw)))
}

fn optional_timestamp_column(row: &Row, column: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        Some(raw) => parse_storage_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| conversion_error(column, format!("bad timestamp '{}'", raw))),
        None => Ok(None),
    }
}

fn row_to_property(row: &Row) -> rusqlite::Result<Property> {
    let property_type: String = row.get(3)?;
    let auction_type: String = row.get(12)?;
    let image_urls: String = row.get(15)?;

    Ok(Property {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        property_type: PropertyType::parse(&property_type)
            .ok_or_else(|| conversion_error(3, format!("unknown property type '{}'", property_type)))?,
        city: row.get(4)?,
        neighborhood: row.get(5)?,
        address: row.get(6)?,
        area_m2: row.get(7)?,
        bedrooms: row.get(8)?,
        first_auction_price: row.get(9)?,
        second_auction_price: row.get(10)?,
        appraisal_value: row.get(11)?,
        auction_type: AuctionModality::parse(&auction_type)
            .ok_or_else(|| conversion_error(12, format!("unknown auction type '{}'", auction_type)))?,
        first_auction_at: optional_timestamp_column(row, 13)?,
        second_auction_at: optional_timestamp_column(row, 14)?,
        image_urls: serde_json::from_str(&image_urls).map_err(|e| conversion_error(15, e.to_string()))?,
        notice_url: row.get(16)?,
        is_active: row.get(17)?,
        created_at: timestamp_column(row, 18)?,
        updated_at: timestamp_column(row, 19)?,
    })
}

fn min_bid(input: &PropertyInput) -> i64 {
    input.second_auction_price.unwrap_or(input.first_auction_price)
}

fn image_urls_json(input: &PropertyInput) -> rusqlite::Result<String> {
    serde_json::to_string(&input.image_urls).map_err(|e| RusqliteError::ToSqlConversionFailure(Box::new(e)))
}

pub fn create_property(conn: &Connection, input: &PropertyInput) -> Result<String, RusqliteError> {
    let id = Uuid::new_v4().to_string();
    let now = storage_timestamp(Utc::now());
    conn.execute(
        &format!(
            "INSERT INTO properties ({}, min_bid) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            PROPERTY_COLUMNS
        ),
        params![
            id,
            input.title.trim(),
            input.description,
            input.property_type.as_str(),
            input.city.trim(),
            input.neighborhood.trim(),
            input.address,
            input.area_m2,
            input.bedrooms,
            input.first_auction_price,
            input.second_auction_price,
            input.appraisal_value,
            input.auction_type.as_str(),
            input.first_auction_at.map(storage_timestamp),
            input.second_auction_at.map(storage_timestamp),
            image_urls_json(input)?,
            input.notice_url,
            input.is_active,
            now,
            now,
            min_bid(input),
        ],
    )?;
    Ok(id)
}

/// Replaces every editable field. Returns false when the id is unknown.
pub fn update_property(conn: &Connection, id: &str, input: &PropertyInput) -> Result<bool, RusqliteError> {
    let changed = conn.execute(
        "UPDATE properties SET title = ?1, description = ?2, property_type = ?3, city = ?4, neighborhood = ?5,
            address = ?6, area_m2 = ?7, bedrooms = ?8, first_auction_price = ?9, second_auction_price = ?10,
            appraisal_value = ?11, auction_type = ?12, first_auction_at = ?13, second_auction_at = ?14,
            image_urls = ?15, notice_url = ?16, is_active = ?17, updated_at = ?18, min_bid = ?19
         WHERE id = ?20",
        params![
            input.title.trim(),
            input.description,
            input.property_type.as_str(),
            input.city.trim(),
            input.neighborhood.trim(),
            input.address,
            input.area_m2,
            input.bedrooms,
            input.first_auction_price,
            input.second_auction_price,
            input.appraisal_value,
            input.auction_type.as_str(),
            input.first_auction_at.map(storage_timestamp),
            input.second_auction_at.map(storage_timestamp),
            image_urls_json(input)?,
            input.notice_url,
            input.is_active,
            storage_timestamp(Utc::now()),
            min_bid(input),
            id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn set_property_active(conn: &Connection, id: &str, is_active: bool) -> Result<bool, RusqliteError> {
    let changed = conn.execute(
        "UPDATE properties SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![is_active, storage_timestamp(Utc::now()), id],
    )?;
    Ok(changed > 0)
}

pub fn delete_property(conn: &Connection, id: &str) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM properties WHERE id = ?1", [id])
}

pub fn read_property(conn: &Connection, id: &str) -> Result<Option<Property>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM properties WHERE id = ?1", PROPERTY_COLUMNS),
        [id],
        row_to_property,
    )
    .optional()
}

pub fn count_properties(conn: &Connection, query: &PropertyQuery) -> Result<u64, RusqliteError> {
    let (where_sql, params) = query.where_sql();
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM properties{}", where_sql),
        params_from_iter(params.iter()),
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or(0))
}

pub fn search_properties(conn: &Connection, query: &PropertyQuery, page: Page) -> Result<Vec<Property>, RusqliteError> {
    let (where_sql, mut params) = query.where_sql();
    params.push(rusqlite::types::Value::Integer(i64::from(page.size)));
    params.push(rusqlite::types::Value::Integer(i64::try_from(page.offset()).unwrap_or(i64::MAX)));

    let sql = format!(
        "SELECT {} FROM properties{}{} LIMIT ? OFFSET ?",
        PROPERTY_COLUMNS,
        where_sql,
        query.order_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), row_to_property)?;

    let mut properties = Vec::new();
    for property in rows {
        properties.push(property?);
    }
    Ok(properties)
}

/// Distinct (city, neighborhood) pairs of active listings, for the filter
/// dropdowns.
pub fn read_locations(conn: &Connection) -> Result<Vec<(String, String)>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT city, neighborhood FROM properties WHERE is_active = 1 ORDER BY city, neighborhood",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}
