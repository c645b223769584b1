// Copyright 2025 Benchboard Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tolerant ISO-8601 parsing and report timestamp formatting.
//!
//! Result files come from many independent harnesses, so the `date` field
//! shows up in several shapes: full RFC 3339 with a trailing `Z` or an
//! offset, a naive datetime, or a bare date. Anything naive is assumed UTC.
//! A string that matches none of these is not an error; the caller keeps the
//! raw string and simply has no recency timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse an ISO-8601-like date string into a UTC timestamp.
///
/// Accepted forms, tried in order:
/// 1. RFC 3339 (`2024-01-01T00:00:00Z`, `2024-01-01T00:00:00+02:00`)
/// 2. naive datetime (`2024-01-01T00:00:00`, `2024-01-01 00:00:00.5`)
/// 3. bare date (`2024-01-01`), taken as midnight UTC
pub fn parse_iso_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Format a timestamp for the report header, e.g. `2024-01-01 13:37:00 UTC`.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format a timestamp for a date table cell, e.g. `2024-01-01`.
pub fn format_day(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Format the generation stamp shown in the topbar, e.g. `2024-01-01 13:37:00Z`.
pub fn format_stamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%SZ").to_string()
}
