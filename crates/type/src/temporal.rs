// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Date parsing and the canonical ISO-8601 rendering used for stored dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATETIME_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parses the date notations accepted from callers. Values without an offset
/// are taken as UTC.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
	let text = text.trim();
	if text.is_empty() {
		return None;
	}

	if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
		return Some(parsed.with_timezone(&Utc));
	}

	for format in DATETIME_FORMATS {
		if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
			return Some(parsed.and_utc());
		}
	}

	for format in DATE_FORMATS {
		if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
			return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
		}
	}

	None
}

/// Milliseconds since the Unix epoch.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
	DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Renders `2024-03-01T00:00:00.000Z`.
pub fn to_iso(value: &DateTime<Utc>) -> String {
	value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
