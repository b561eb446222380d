// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time in the format stored in `createdAt`/`updatedAt` fields.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Today's date as `YYYY-MM-DD` (UTC).
pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` day string.
pub fn parse_day(day: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parse a stored timestamp. Accepts RFC3339 and bare `YYYY-MM-DD`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_day(value)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uses_z_suffix() {
        let date = Utc.with_ymd_and_hms(2024, 5, 3, 6, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2024-05-03T06:30:00.000Z");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 3, 6, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-03T06:30:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-03T08:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-03"),
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_day() {
        assert!(parse_day("2024-02-29").is_some());
        assert!(parse_day("2024-02-30").is_none());
        assert!(parse_day("2024-05-03T06:00").is_none());
    }
}
