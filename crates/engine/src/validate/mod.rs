// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Checks raw row fields against a table's columns and coerces them into
//! typed [`Value`]s.
//!
//! A field is blank when it is absent, `null`, or a string of whitespace.
//! Blank fields never reach the store. Keys that name no column, and the
//! reserved `id` key, are ignored.

use std::collections::BTreeMap;

use tabula_type::{ColumnType, Fields, Value, temporal};

use crate::{Error, FieldError, FieldErrorKind, schema::ColumnDef};

/// Coerced row data keyed by column name.
pub type Coerced = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
	/// In column order.
	pub errors: Vec<FieldError>,
}

impl ValidationResult {
	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn into_result(self) -> crate::Result<()> {
		if self.errors.is_empty() {
			Ok(())
		} else {
			Err(Error::validation(self.errors))
		}
	}
}

/// Changes a partial update makes to a stored row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
	pub set: Coerced,
	/// Optional columns the update blanked out.
	pub clear: Vec<String>,
}

/// Reports every problem with `fields`, not just the first.
pub fn validate(fields: &Fields, columns: &[ColumnDef]) -> ValidationResult {
	let mut errors = vec![];
	for column in columns {
		match fields.get(&column.name).filter(|value| !is_blank(value)) {
			None if column.required => errors.push(FieldError::required(&column.name)),
			None => {}
			Some(value) => {
				if let Err(kind) = check_type(value, column.ty) {
					errors.push(FieldError::new(&column.name, kind));
				}
			}
		}
	}
	ValidationResult {
		errors,
	}
}

/// Typed values for every non-blank field that names a column. Fields that
/// cannot be coerced are skipped; run [`validate`] first.
pub fn coerce(fields: &Fields, columns: &[ColumnDef]) -> Coerced {
	columns
		.iter()
		.filter_map(|column| {
			let value = fields.get(&column.name).filter(|value| !is_blank(value))?;
			coerce_value(value, column.ty).map(|value| (column.name.clone(), value))
		})
		.collect()
}

/// [`validate`] then [`coerce`].
pub fn check(fields: &Fields, columns: &[ColumnDef]) -> crate::Result<Coerced> {
	validate(fields, columns).into_result()?;
	Ok(coerce(fields, columns))
}

/// Checks only the keys present in `fields`. Blanking a required column is
/// an error; blanking an optional one clears it.
pub fn check_patch(fields: &Fields, columns: &[ColumnDef]) -> crate::Result<Patch> {
	let mut patch = Patch::default();
	let mut errors = vec![];

	for column in columns {
		let Some(value) = fields.get(&column.name) else {
			continue;
		};
		if is_blank(value) {
			if column.required {
				errors.push(FieldError::required(&column.name));
			} else {
				patch.clear.push(column.name.clone());
			}
			continue;
		}
		if let Err(kind) = check_type(value, column.ty) {
			errors.push(FieldError::new(&column.name, kind));
			continue;
		}
		if let Some(coerced) = coerce_value(value, column.ty) {
			patch.set.insert(column.name.clone(), coerced);
		}
	}

	if errors.is_empty() {
		Ok(patch)
	} else {
		Err(Error::validation(errors))
	}
}

pub fn is_blank(value: &serde_json::Value) -> bool {
	match value {
		serde_json::Value::Null => true,
		serde_json::Value::String(s) => s.trim().is_empty(),
		_ => false,
	}
}

fn check_type(value: &serde_json::Value, ty: ColumnType) -> Result<(), FieldErrorKind> {
	match ty {
		ColumnType::Number => parse_number(value).map(|_| ()).ok_or(FieldErrorKind::NotANumber),
		ColumnType::Date => parse_date(value).map(|_| ()).ok_or(FieldErrorKind::InvalidDate),
		// select membership is not enforced
		ColumnType::Text | ColumnType::Boolean | ColumnType::Select | ColumnType::Link => Ok(()),
	}
}

fn coerce_value(value: &serde_json::Value, ty: ColumnType) -> Option<Value> {
	match ty {
		ColumnType::Number => parse_number(value).map(Value::Number),
		ColumnType::Date => parse_date(value).map(Value::Date),
		ColumnType::Boolean => Some(Value::Bool(parse_bool(value))),
		ColumnType::Text | ColumnType::Select | ColumnType::Link => Value::from_stored(value, None),
	}
}

fn parse_number(value: &serde_json::Value) -> Option<f64> {
	let number = match value {
		serde_json::Value::Number(n) => n.as_f64()?,
		serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
		_ => return None,
	};
	number.is_finite().then_some(number)
}

/// Strings go through [`temporal::parse_date`]; integers are epoch
/// milliseconds.
fn parse_date(value: &serde_json::Value) -> Option<chrono::DateTime<chrono::Utc>> {
	match value {
		serde_json::Value::String(s) => temporal::parse_date(s),
		serde_json::Value::Number(n) => temporal::from_epoch_millis(n.as_i64()?),
		_ => None,
	}
}

fn parse_bool(value: &serde_json::Value) -> bool {
	match value {
		serde_json::Value::Null => false,
		serde_json::Value::Bool(b) => *b,
		serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
		serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
			"false" | "0" | "no" | "off" | "" => false,
			_ => true,
		},
		serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
	}
}
