// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection, Filter};
use tabula_type::{RowId, TableId};
use tracing::{debug, instrument};

use crate::row::RowStore;

impl<S: BackingStore> RowStore<S> {
	/// Deleting a row that does not exist succeeds.
	#[instrument(name = "rows::delete_row", level = "debug", skip(self), fields(table = %table, row = %row))]
	pub fn delete_row(&self, table: TableId, row: RowId) -> crate::Result<()> {
		let removed = self.store.delete_where(Collection::Rows, &Filter::id(row.0).and_parent(table.0))?;
		debug!(table = %table, row = %row, removed, "row deleted");
		Ok(())
	}
}
