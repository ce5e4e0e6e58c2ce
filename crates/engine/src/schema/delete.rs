// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection};
use tabula_type::TableId;
use tracing::{debug, instrument};

use crate::{Error, schema::SchemaRegistry};

impl<S: BackingStore> SchemaRegistry<S> {
	/// Removes the table with its columns and rows.
	#[instrument(name = "schema::delete_table", level = "debug", skip(self), fields(table = %id))]
	pub fn delete_table(&self, id: TableId) -> crate::Result<()> {
		if !self.store.delete(Collection::Tables, id.0)? {
			return Err(Error::table_not_found(id));
		}
		debug!(table = %id, "table deleted");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tabula_store::{NewDocument, memory::MemoryBackend};
	use tabula_type::ColumnType;

	use super::*;
	use crate::schema::{ColumnToCreate, TableToCreate};

	#[test]
	fn test_delete_cascades() {
		let registry = SchemaRegistry::new(MemoryBackend::new());
		let table = registry
			.create_table(TableToCreate::new("T").column(ColumnToCreate::new("A", ColumnType::Text)))
			.unwrap();
		registry
			.store()
			.insert(Collection::Rows, NewDocument::new(json!({"A": "x"})).with_parent(table.id.0))
			.unwrap();

		registry.delete_table(table.id).unwrap();
		assert!(registry.store().is_empty());
	}

	#[test]
	fn test_delete_unknown_table() {
		let registry = SchemaRegistry::new(MemoryBackend::new());
		let err = registry.delete_table(TableId::generate()).unwrap_err();
		assert!(matches!(err, Error::NotFound { .. }));
	}
}
