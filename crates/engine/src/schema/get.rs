// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection, Document, Filter, Order, Query};
use tabula_type::TableId;
use tracing::instrument;

use crate::{
	Error,
	schema::{SchemaRegistry, TableDef, layout::table_def},
};

impl<S: BackingStore> SchemaRegistry<S> {
	#[instrument(name = "schema::get_table", level = "trace", skip(self), fields(table = %id))]
	pub fn get_table(&self, id: TableId) -> crate::Result<TableDef> {
		let table = self.store.get(Collection::Tables, id.0)?.ok_or_else(|| Error::table_not_found(id))?;
		let columns = self.stored_columns(id)?;
		Ok(table_def(&table, &columns)?)
	}

	/// Newest first, each with its columns in position order.
	#[instrument(name = "schema::list_tables", level = "trace", skip(self))]
	pub fn list_tables(&self) -> crate::Result<Vec<TableDef>> {
		self.tables(|_| true)
	}

	#[instrument(name = "schema::list_public_tables", level = "trace", skip(self))]
	pub fn list_public_tables(&self) -> crate::Result<Vec<TableDef>> {
		self.tables(|table| table.is_public)
	}

	fn tables(&self, keep: impl Fn(&TableDef) -> bool) -> crate::Result<Vec<TableDef>> {
		let tables = self.store.query(Collection::Tables, &Query::new(Filter::all()).order(Order::newest_first()))?;

		let mut result = Vec::with_capacity(tables.items.len());
		for table in &tables.items {
			let columns = self.stored_columns(TableId(table.id))?;
			let table = table_def(table, &columns)?;
			if keep(&table) {
				result.push(table);
			}
		}
		Ok(result)
	}

	pub(crate) fn stored_columns(&self, table: TableId) -> tabula_store::Result<Vec<Document>> {
		let page =
			self.store.query(Collection::Columns, &Query::new(Filter::parent(table.0)).order(Order::by_position()))?;
		Ok(page.items)
	}
}
