// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection, Filter, NewDocument, Order, Query, Range};
use tabula_type::{ColumnType, RESERVED_ID_KEY, TableId};
use tracing::{info, instrument, warn};

use crate::schema::{SchemaRegistry, layout::ColumnBody};

/// Tables [`SchemaRegistry::repair`] acted on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
	/// Tables without columns or rows, deleted.
	pub removed: Vec<TableId>,
	/// Tables without columns but with rows, given optional text columns named
	/// after the fields found in their rows.
	pub rebuilt: Vec<TableId>,
	/// Tables without columns whose rows carry no field names. Kept as they are.
	pub unrepairable: Vec<TableId>,
}

impl RepairReport {
	pub fn is_clean(&self) -> bool {
		self.removed.is_empty() && self.rebuilt.is_empty() && self.unrepairable.is_empty()
	}
}

impl<S: BackingStore> SchemaRegistry<S> {
	/// Heals tables a failed compensation left without columns. Running it
	/// twice does nothing the second time.
	#[instrument(name = "schema::repair", level = "info", skip(self))]
	pub fn repair(&self) -> crate::Result<RepairReport> {
		let mut report = RepairReport::default();
		let tables = self.store.query(Collection::Tables, &Query::new(Filter::all()))?;

		for table in &tables.items {
			let id = TableId(table.id);
			let columns = self.store.query(
				Collection::Columns,
				&Query::new(Filter::parent(table.id)).range(Range::window(0, 0)),
			)?;
			if columns.total > 0 {
				continue;
			}

			let rows = self
				.store
				.query(Collection::Rows, &Query::new(Filter::parent(table.id)).order(Order::oldest_first()))?;
			let mut names: Vec<String> = vec![];
			for row in &rows.items {
				let Some(fields) = row.body.as_object() else {
					continue;
				};
				for key in fields.keys() {
					if key != RESERVED_ID_KEY && !key.trim().is_empty() && !names.contains(key) {
						names.push(key.clone());
					}
				}
			}

			if rows.total == 0 {
				warn!(table = %id, "removing table without columns");
				self.store.delete(Collection::Tables, table.id)?;
				report.removed.push(id);
				continue;
			}

			if names.is_empty() {
				warn!(table = %id, rows = rows.total, "table without columns has no field names to rebuild from");
				report.unrepairable.push(id);
				continue;
			}

			let documents = names
				.into_iter()
				.enumerate()
				.map(|(position, name)| {
					let body = ColumnBody {
						name,
						ty: ColumnType::Text,
						required: false,
						options: vec![],
					};
					Ok(NewDocument::new(body.encode()?).with_parent(table.id).with_position(position as i64))
				})
				.collect::<tabula_store::Result<Vec<_>>>()?;

			warn!(table = %id, columns = documents.len(), "rebuilding columns from row data");
			self.store.insert_many(Collection::Columns, documents)?;
			report.rebuilt.push(id);
		}

		info!(
			removed = report.removed.len(),
			rebuilt = report.rebuilt.len(),
			unrepairable = report.unrepairable.len(),
			"repair finished"
		);
		Ok(report)
	}
}
