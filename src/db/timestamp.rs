//! Fixed-width RFC 3339 timestamps for TEXT columns.
//!
//! Always UTC with exactly six fractional digits, so string comparison in SQL
//! orders rows chronologically.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{AppError, AppResult};

#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(column: &'static str, value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::database(column, format!("invalid timestamp {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(whole), "2025-01-02T03:04:05.000000Z");

        let fractional = whole + Duration::microseconds(120);
        assert_eq!(format_timestamp(fractional), "2025-01-02T03:04:05.000120Z");
    }

    #[test]
    fn lexical_order_matches_chronological_order() {
        let a = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let b = a + Duration::microseconds(1);
        assert!(format_timestamp(a) < format_timestamp(b));
    }

    #[test]
    fn parse_round_trips() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + Duration::microseconds(42);
        assert_eq!(parse_timestamp("created_at", &format_timestamp(ts)).unwrap(), ts);
        assert!(parse_timestamp("created_at", "yesterday").is_err());
    }
}
