use crate::catalog::dates::{parse_storage_timestamp, storage_timestamp};
use crate::models::{Channel, MarketingSchedule, ScheduleStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Error as RusqliteError, OptionalExtension, Row};

const SCHEDULE_COLUMNS: &str = "id, name, channel, audience, message, send_at, status, created_at";

fn bad_column(column: usize, message: String) -> RusqliteError {
    RusqliteError::FromSqlConversionFailure(column, Type::Text, message.into())
}

fn row_to_schedule(row: &Row) -> rusqlite::Result<MarketingSchedule> {
    let channel: String = row.get(2)?;
    let audience: String = row.get(3)?;
    let send_at: String = row.get(5)?;
    let status: String = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(MarketingSchedule {
        id: row.get(0)?,
        name: row.get(1)?,
        channel: Channel::parse(&channel).ok_or_else(|| bad_column(2, format!("unknown channel '{}'", channel)))?,
        audience: serde_json::from_str(&audience).map_err(|e| bad_column(3, e.to_string()))?,
        message: row.get(4)?,
        send_at: parse_storage_timestamp(&send_at).ok_or_else(|| bad_column(5, format!("bad timestamp '{}'", send_at)))?,
        status: ScheduleStatus::parse(&status).ok_or_else(|| bad_column(6, format!("unknown status '{}'", status)))?,
        created_at: parse_storage_timestamp(&created_at)
            .ok_or_else(|| bad_column(7, format!("bad timestamp '{}'", created_at)))?,
    })
}

pub fn add_schedule(conn: &Connection, schedule: &MarketingSchedule) -> Result<(), RusqliteError> {
    let audience = serde_json::to_string(&schedule.audience).map_err(|e| RusqliteError::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        &format!("INSERT INTO marketing_schedules ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)", SCHEDULE_COLUMNS),
        params![
            schedule.id,
            schedule.name,
            schedule.channel.as_str(),
            audience,
            schedule.message,
            storage_timestamp(schedule.send_at),
            schedule.status.as_str(),
            storage_timestamp(schedule.created_at),
        ],
    )?;
    Ok(())
}

pub fn read_schedule(conn: &Connection, id: &str) -> Result<Option<MarketingSchedule>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM marketing_schedules WHERE id = ?1", SCHEDULE_COLUMNS),
        [id],
        row_to_schedule,
    )
    .optional()
}

/// Soonest first.
pub fn list_schedules(conn: &Connection) -> Result<Vec<MarketingSchedule>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM marketing_schedules ORDER BY send_at ASC, created_at ASC",
        SCHEDULE_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_schedule)?;
    rows.collect()
}

/// Moves a schedule from `from` to `to`; false when it was not in `from`.
pub fn transition_status(
    conn: &Connection,
    id: &str,
    from: ScheduleStatus,
    to: ScheduleStatus,
) -> Result<bool, RusqliteError> {
    let changed = conn.execute(
        "UPDATE marketing_schedules SET status = ?1 WHERE id = ?2 AND status = ?3",
        params![to.as_str(), id, from.as_str()],
    )?;
    Ok(changed > 0)
}

/// Marks every pending schedule due at `now` as queued and returns them,
/// inside one transaction so two callers never queue the same schedule.
pub fn queue_due_schedules(conn: &mut Connection, now: DateTime<Utc>) -> Result<Vec<MarketingSchedule>, RusqliteError> {
    let tx = conn.transaction()?;
    let due = {
        let mut stmt = tx.prepare(&format!(
            "SELECT {} FROM marketing_schedules WHERE status = 'pending' AND send_at <= ?1 ORDER BY send_at ASC",
            SCHEDULE_COLUMNS
        ))?;
        let rows = stmt.query_map([storage_timestamp(now)], row_to_schedule)?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    for schedule in &due {
        tx.execute(
            "UPDATE marketing_schedules SET status = 'queued' WHERE id = ?1",
            [&schedule.id],
        )?;
    }
    tx.commit()?;

    Ok(due
        .into_iter()
        .map(|s| MarketingSchedule { status: ScheduleStatus::Queued, ..s })
        .collect())
}
