// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection, NewDocument};
use tabula_type::{Fields, TableId};
use tracing::{debug, instrument};

use crate::{
	Error, FieldError, FieldErrorKind,
	row::{Row, RowStore, encode_data},
	validate,
};

impl<S: BackingStore> RowStore<S> {
	/// Validates `fields` against the table's current columns and stores the
	/// coerced values. Unknown keys and `id` are dropped.
	#[instrument(name = "rows::add_row", level = "debug", skip(self, fields), fields(table = %table, fields = fields.len()))]
	pub fn add_row(&self, table: TableId, fields: Fields) -> crate::Result<Row> {
		let def = self.registry.get_table(table)?;
		if def.columns.is_empty() {
			return Err(Error::validation(vec![FieldError::new("columns", FieldErrorKind::Empty)]));
		}

		let data = validate::check(&fields, &def.columns)?;
		let document = self.store.insert(Collection::Rows, NewDocument::new(encode_data(&data)).with_parent(table.0))?;

		debug!(table = %table, row = %document.id, "row added");
		Row::decode(&def, document)
	}
}
