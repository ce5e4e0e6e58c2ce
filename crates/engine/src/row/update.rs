// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection, DocumentUpdate, StoreError};
use tabula_type::{Fields, RESERVED_ID_KEY, RowId, TableId};
use tracing::{debug, instrument};

use crate::{
	Error,
	row::{Row, RowStore},
	validate,
};

impl<S: BackingStore> RowStore<S> {
	/// Merges `partial` into the stored row. Only the given keys are checked;
	/// a blank value clears an optional field. A concurrent write to the same
	/// row makes the merge start over from the latest version.
	#[instrument(
		name = "rows::update_row",
		level = "debug",
		skip(self, partial),
		fields(table = %table, row = %row, fields = partial.len())
	)]
	pub fn update_row(&self, table: TableId, row: RowId, partial: Fields) -> crate::Result<Row> {
		let def = self.registry.get_table(table)?;
		let patch = validate::check_patch(&partial, &def.columns)?;

		let mut attempts = 0;
		loop {
			attempts += 1;
			let current = self.find(table, row)?.ok_or_else(|| Error::row_not_found(row))?;

			let serde_json::Value::Object(mut body) = current.body else {
				return Err(StoreError::Corrupt {
					collection: Collection::Rows,
					reason: format!("row {} is not an object", row),
				}
				.into());
			};
			body.remove(RESERVED_ID_KEY);
			for key in &patch.clear {
				body.remove(key);
			}
			for (key, value) in &patch.set {
				body.insert(key.clone(), value.to_json());
			}

			let update = DocumentUpdate::new(serde_json::Value::Object(body)).if_version(current.version);
			match self.store.update(Collection::Rows, row.0, update) {
				Ok(document) => {
					debug!(table = %table, row = %row, version = document.version, "row updated");
					return Row::decode(&def, document);
				}
				Err(StoreError::Conflict {
					..
				}) if attempts <= self.update_retries => {
					debug!(table = %table, row = %row, attempts, "row changed concurrently, merging again");
				}
				Err(StoreError::Conflict {
					..
				}) => {
					return Err(Error::Conflict {
						table,
						row,
						attempts,
					});
				}
				Err(StoreError::NotFound {
					..
				}) => return Err(Error::row_not_found(row)),
				Err(err) => return Err(err.into()),
			}
		}
	}
}
