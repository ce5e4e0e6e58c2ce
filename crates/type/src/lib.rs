// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::collections::BTreeMap;

pub use serde_json;

mod column_type;
pub mod diagnostic;
mod id;
pub mod temporal;
mod value;

pub use column_type::{ColumnType, UnknownColumnType};
pub use diagnostic::{Diagnostic, IntoDiagnostic};
pub use id::{ColumnId, RowId, TableId};
pub use value::Value;

/// Untyped payload handed in by callers, keyed by column name.
pub type Fields = BTreeMap<String, serde_json::Value>;

/// Key every flattened row carries for its own id.
pub const RESERVED_ID_KEY: &str = "id";

/// Builds a [`Fields`] map from `key => value` pairs.
///
/// ```
/// use tabula_type::fields;
///
/// let fields = fields! { "Item" => "Pen", "Qty" => 5 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
	() => {
		$crate::Fields::new()
	};
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut fields = $crate::Fields::new();
		$(
			fields.insert(::std::string::String::from($key), $crate::serde_json::Value::from($value));
		)+
		fields
	}};
}
