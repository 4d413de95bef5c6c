//! Time conversions for the site's locale. Auctions are announced in
//! Brasília time (UTC-3, no daylight saving); storage keeps UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

pub const SITE_UTC_OFFSET_HOURS: i32 = -3;

pub fn site_offset() -> FixedOffset {
    FixedOffset::east_opt(SITE_UTC_OFFSET_HOURS * 3600).expect("UTC-3 is a valid offset")
}

pub fn local_datetime_to_utc(local: NaiveDateTime) -> Option<DateTime<Utc>> {
    site_offset()
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Last second of `date` in the site's locale, as a UTC instant.
pub fn end_of_local_day_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(23, 59, 59).and_then(local_datetime_to_utc)
}

pub fn to_local(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&site_offset())
}

pub fn format_local(instant: DateTime<Utc>) -> String {
    to_local(instant).format("%d/%m/%Y %H:%M").to_string()
}

/// Canonical text form used in SQLite columns; sorts lexically in time order.
pub fn storage_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_storage_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Parses an HTML `datetime-local` value (`2024-05-10T14:30`) typed in the
/// site's locale.
pub fn parse_local_input(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M")
        .ok()
        .and_then(local_datetime_to_utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_day_crosses_into_next_utc_day() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date");
        let instant = end_of_local_day_utc(date).expect("fixed offset is unambiguous");
        assert_eq!(storage_timestamp(instant), "2025-01-01T02:59:59Z");
    }

    #[test]
    fn local_input_round_trips_for_display() {
        let instant = parse_local_input("2024-05-10T14:30").expect("parses");
        assert_eq!(storage_timestamp(instant), "2024-05-10T17:30:00Z");
        assert_eq!(format_local(instant), "10/05/2024 14:30");
        assert_eq!(parse_storage_timestamp("2024-05-10T17:30:00Z"), Some(instant));
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(parse_local_input("amanhã").is_none());
    }
}
