// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	error::Error,
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Declared type of a column. The identifiers are the ones exchanged with
/// calling UI code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
	Text,
	Number,
	Date,
	Boolean,
	/// Free-form choice backed by the column's `options` list.
	Select,
	Link,
}

impl ColumnType {
	pub const ALL: [ColumnType; 6] = [
		ColumnType::Text,
		ColumnType::Number,
		ColumnType::Date,
		ColumnType::Boolean,
		ColumnType::Select,
		ColumnType::Link,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ColumnType::Text => "text",
			ColumnType::Number => "number",
			ColumnType::Date => "date",
			ColumnType::Boolean => "boolean",
			ColumnType::Select => "select",
			ColumnType::Link => "link",
		}
	}

	/// Only select columns carry options.
	pub fn has_options(&self) -> bool {
		matches!(self, ColumnType::Select)
	}
}

impl Display for ColumnType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumnType(pub String);

impl Display for UnknownColumnType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "unknown column type '{}'", self.0)
	}
}

impl Error for UnknownColumnType {}

impl FromStr for ColumnType {
	type Err = UnknownColumnType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"text" => Ok(ColumnType::Text),
			"number" => Ok(ColumnType::Number),
			"date" => Ok(ColumnType::Date),
			"boolean" => Ok(ColumnType::Boolean),
			"select" => Ok(ColumnType::Select),
			"link" => Ok(ColumnType::Link),
			_ => Err(UnknownColumnType(s.to_string())),
		}
	}
}
