//! Column conversions shared by the SQLite repositories
//!
//! Timestamps are stored as unix milliseconds, UUIDs and calendar days as text.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use uuid::Uuid;

const DAY_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn opt_millis(ts: Option<DateTime<Utc>>) -> Option<i64> {
    ts.map(to_millis)
}

pub(crate) fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| conversion_error(idx, Type::Integer, format!("timestamp out of range: {millis}")))
}

pub(crate) fn opt_from_millis(
    idx: usize,
    millis: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    millis.map(|m| from_millis(idx, m)).transpose()
}

pub(crate) fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| conversion_error(idx, Type::Text, e.to_string()))
}

pub(crate) fn day_to_text(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub(crate) fn parse_day(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|e| conversion_error(idx, Type::Text, e.to_string()))
}

pub(crate) fn opt_parse_day(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<NaiveDate>> {
    raw.map(|s| parse_day(idx, &s)).transpose()
}

/// Parse a status-style text column through its `FromStr` impl.
pub(crate) fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|e| conversion_error(idx, Type::Text, e))
}

fn conversion_error(idx: usize, ty: Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, message.into())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use focusflow_domain::SessionStatus;

    use super::*;

    #[test]
    fn millis_keep_sub_second_precision() {
        let ts = Utc.timestamp_millis_opt(1_772_442_000_123).unwrap();
        assert_eq!(from_millis(0, to_millis(ts)).unwrap(), ts);
    }

    #[test]
    fn days_use_iso_format() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(day_to_text(day), "2026-03-02");
        assert_eq!(parse_day(0, "2026-03-02").unwrap(), day);
        assert_eq!(opt_parse_day(0, Some("2026-03-02".into())).unwrap(), Some(day));
        assert_eq!(opt_parse_day(0, None).unwrap(), None);
        assert!(parse_day(0, "03/02/2026").is_err());
    }

    #[test]
    fn bad_values_become_conversion_failures() {
        assert!(matches!(
            parse_uuid(3, "not-a-uuid"),
            Err(rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _))
        ));
        assert!(parse_enum::<SessionStatus>(1, "paused").is_err());
    }
}
