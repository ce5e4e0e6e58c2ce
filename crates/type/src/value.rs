// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Number;

use crate::{ColumnType, temporal};

/// Largest integer an f64 represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A stored row value. The backing store keeps plain JSON; the variant is
/// decided by the declared type of the column the value belongs to.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Text(String),
	/// Always finite.
	Number(f64),
	Bool(bool),
	/// Serialized as an ISO-8601 string.
	Date(DateTime<Utc>),
}

impl Value {
	pub fn text(v: impl Into<String>) -> Self {
		Value::Text(v.into())
	}

	/// `None` for NaN and infinities.
	pub fn number(v: f64) -> Option<Self> {
		v.is_finite().then_some(Value::Number(v))
	}

	/// Tags a stored JSON value. Strings of date columns become dates when
	/// they parse; everything else is tagged by its JSON shape. Nulls are
	/// treated as absent.
	pub fn from_stored(json: &serde_json::Value, ty: Option<ColumnType>) -> Option<Self> {
		match json {
			serde_json::Value::Null => None,
			serde_json::Value::String(s) => {
				if ty == Some(ColumnType::Date) {
					if let Some(date) = temporal::parse_date(s) {
						return Some(Value::Date(date));
					}
				}
				Some(Value::Text(s.clone()))
			}
			serde_json::Value::Number(n) => n.as_f64().and_then(Value::number),
			serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
			other => Some(Value::Text(other.to_string())),
		}
	}

	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Value::Text(s) => serde_json::Value::String(s.clone()),
			Value::Number(n) => number_to_json(*n),
			Value::Bool(b) => serde_json::Value::Bool(*b),
			Value::Date(d) => serde_json::Value::String(temporal::to_iso(d)),
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Value::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_number(&self) -> Option<f64> {
		match self {
			Value::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_date(&self) -> Option<&DateTime<Utc>> {
		match self {
			Value::Date(d) => Some(d),
			_ => None,
		}
	}
}

// integral numbers are kept as JSON integers so `5` reads back as `5`, not `5.0`
fn number_to_json(n: f64) -> serde_json::Value {
	if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
		serde_json::Value::Number(Number::from(n as i64))
	} else {
		Number::from_f64(n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Value::Text(s) => serializer.serialize_str(s),
			Value::Bool(b) => serializer.serialize_bool(*b),
			Value::Date(d) => serializer.serialize_str(&temporal::to_iso(d)),
			Value::Number(_) => self.to_json().serialize(serializer),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Text(s) => f.write_str(s),
			Value::Number(_) => write!(f, "{}", self.to_json()),
			Value::Bool(b) => write!(f, "{}", b),
			Value::Date(d) => f.write_str(&temporal::to_iso(d)),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Text(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Text(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Number(value as f64)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Value::Date(value)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_integral_numbers_serialize_as_integers() {
		assert_eq!(Value::Number(5.0).to_json(), json!(5));
		assert_eq!(Value::Number(2.5).to_json(), json!(2.5));
		assert_eq!(serde_json::to_string(&Value::Number(-3.0)).unwrap(), "-3");
	}

	#[test]
	fn test_non_finite_numbers_are_rejected() {
		assert!(Value::number(f64::NAN).is_none());
		assert!(Value::number(f64::INFINITY).is_none());
	}

	#[test]
	fn test_date_serializes_as_iso_string() {
		let date = temporal::parse_date("2024-01-02").unwrap();
		assert_eq!(serde_json::to_value(Value::Date(date)).unwrap(), json!("2024-01-02T00:00:00.000Z"));
	}

	#[test]
	fn test_from_stored_uses_column_type_for_dates() {
		let stored = json!("2024-01-02T00:00:00.000Z");
		assert!(matches!(Value::from_stored(&stored, Some(ColumnType::Date)), Some(Value::Date(_))));
		assert!(matches!(Value::from_stored(&stored, Some(ColumnType::Text)), Some(Value::Text(_))));
		assert!(matches!(Value::from_stored(&stored, None), Some(Value::Text(_))));
	}

	#[test]
	fn test_from_stored_null_is_absent() {
		assert_eq!(Value::from_stored(&serde_json::Value::Null, Some(ColumnType::Text)), None);
	}

	#[test]
	fn test_from_stored_shapes() {
		assert_eq!(Value::from_stored(&json!(4), None), Some(Value::Number(4.0)));
		assert_eq!(Value::from_stored(&json!(false), None), Some(Value::Bool(false)));
		assert_eq!(Value::from_stored(&json!(["a"]), None), Some(Value::text("[\"a\"]")));
	}
}
