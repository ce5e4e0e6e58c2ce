// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection, Document, Filter, Order, Query, Range};
use tabula_type::{RowId, TableId};
use tracing::instrument;

use crate::{
	Error, FieldError, FieldErrorKind,
	row::{FlatRow, Row, RowPage, RowStore},
};

impl<S: BackingStore> RowStore<S> {
	#[instrument(name = "rows::get_row", level = "trace", skip(self), fields(table = %table, row = %row))]
	pub fn get_row(&self, table: TableId, row: RowId) -> crate::Result<Row> {
		let def = self.registry.get_table(table)?;
		let document = self.find(table, row)?.ok_or_else(|| Error::row_not_found(row))?;
		Row::decode(&def, document)
	}

	/// One page of rows, newest first. `page` counts from 1.
	#[instrument(name = "rows::list_rows", level = "trace", skip(self), fields(table = %table))]
	pub fn list_rows(&self, table: TableId, page: u64, page_size: u64) -> crate::Result<RowPage> {
		let mut errors = vec![];
		if page < 1 {
			errors.push(FieldError::new(
				"page",
				FieldErrorKind::TooSmall {
					min: 1,
				},
			));
		}
		if page_size < 1 {
			errors.push(FieldError::new(
				"page size",
				FieldErrorKind::TooSmall {
					min: 1,
				},
			));
		} else if page_size > self.max_page_size {
			errors.push(FieldError::new(
				"page size",
				FieldErrorKind::TooLarge {
					max: self.max_page_size,
				},
			));
		}
		if !errors.is_empty() {
			return Err(Error::validation(errors));
		}

		let def = self.registry.get_table(table)?;
		let offset = (page - 1).saturating_mul(page_size);
		let result = self.store.query(
			Collection::Rows,
			&Query::new(Filter::parent(table.0)).order(Order::newest_first()).range(Range::window(offset, page_size)),
		)?;

		let rows = result
			.items
			.into_iter()
			.map(|document| Row::decode(&def, document).map(Row::flatten))
			.collect::<crate::Result<Vec<_>>>()?;

		Ok(RowPage {
			rows,
			total: result.total,
			page,
			page_size,
			total_pages: result.total.div_ceil(page_size).max(1),
		})
	}

	/// [`RowStore::list_rows`] with the configured default page size.
	#[instrument(name = "rows::list_page", level = "trace", skip(self), fields(table = %table))]
	pub fn list_page(&self, table: TableId, page: u64) -> crate::Result<RowPage> {
		self.list_rows(table, page, self.default_page_size)
	}

	/// Every row of the table, newest first.
	#[instrument(name = "rows::list_all_rows", level = "trace", skip(self), fields(table = %table))]
	pub fn list_all_rows(&self, table: TableId) -> crate::Result<Vec<FlatRow>> {
		let def = self.registry.get_table(table)?;
		let result =
			self.store.query(Collection::Rows, &Query::new(Filter::parent(table.0)).order(Order::newest_first()))?;

		result.items.into_iter().map(|document| Row::decode(&def, document).map(Row::flatten)).collect()
	}

	pub(crate) fn find(&self, table: TableId, row: RowId) -> crate::Result<Option<Document>> {
		let result = self.store.query(Collection::Rows, &Query::new(Filter::id(row.0).and_parent(table.0)))?;
		Ok(result.items.into_iter().next())
	}
}
