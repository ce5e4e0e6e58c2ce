// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tabula_store::{BackingStore, Collection, Document, DocumentUpdate, Filter, NewDocument, StoreError};
use tabula_type::TableId;
use tracing::{debug, error, instrument, warn};

use crate::{
	Error, RollbackOutcome, SchemaOperation,
	schema::{
		ColumnToCreate, SchemaRegistry,
		create::{check_columns, check_table_name, column_documents, normalize_description},
		layout::TableBody,
	},
};

/// Unset fields are left as they are. `columns` replaces every column of the
/// table, giving them new ids; use [`SchemaRegistry::alter_columns`] to keep
/// them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableUpdate {
	pub name: Option<String>,
	/// `Some(None)` clears the description.
	pub description: Option<Option<String>>,
	pub is_public: Option<bool>,
	pub columns: Option<Vec<ColumnToCreate>>,
}

impl TableUpdate {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn description(mut self, description: Option<String>) -> Self {
		self.description = Some(description);
		self
	}

	pub fn public(mut self, is_public: bool) -> Self {
		self.is_public = Some(is_public);
		self
	}

	pub fn columns(mut self, columns: Vec<ColumnToCreate>) -> Self {
		self.columns = Some(columns);
		self
	}
}

impl<S: BackingStore> SchemaRegistry<S> {
	#[instrument(name = "schema::update_table", level = "debug", skip(self, update), fields(table = %id))]
	pub fn update_table(&self, id: TableId, update: TableUpdate) -> crate::Result<()> {
		let mut errors = vec![];
		if let Some(name) = &update.name {
			check_table_name(name, &mut errors);
		}
		if let Some(columns) = &update.columns {
			check_columns(columns, &mut errors);
		}
		if !errors.is_empty() {
			return Err(Error::validation(errors));
		}

		let current = self.store.get(Collection::Tables, id.0)?.ok_or_else(|| Error::table_not_found(id))?;
		let previous = TableBody::decode(&current)?;

		let mut body = previous.clone();
		if let Some(name) = update.name {
			body.name = name.trim().to_string();
		}
		if let Some(description) = update.description {
			body.description = normalize_description(description);
		}
		if let Some(is_public) = update.is_public {
			body.is_public = is_public;
		}

		let Some(columns) = update.columns else {
			self.store.update(Collection::Tables, id.0, DocumentUpdate::new(body.encode()?))?;
			return Ok(());
		};

		let replacement = column_documents(id, &columns)?;
		let existing = self.stored_columns(id)?;

		self.store.update(Collection::Tables, id.0, DocumentUpdate::new(body.encode()?))?;

		if let Err(cause) = self.store.delete_where(Collection::Columns, &Filter::parent(id.0)) {
			warn!(table = %id, error = %cause, "removing columns failed, restoring table");
			let rollback = self.restore(id, &previous, None);
			return Err(partial_failure(id, cause, rollback));
		}

		if let Err(cause) = self.store.insert_many(Collection::Columns, replacement) {
			warn!(table = %id, error = %cause, "storing columns failed, restoring table");
			let rollback = self.restore(id, &previous, Some(existing));
			return Err(partial_failure(id, cause, rollback));
		}

		debug!(table = %id, columns = columns.len(), "columns replaced");
		Ok(())
	}

	/// Puts back the header and, when given, the removed columns with their
	/// original ids and positions.
	fn restore(&self, id: TableId, previous: &TableBody, columns: Option<Vec<Document>>) -> RollbackOutcome {
		let result = (|| -> tabula_store::Result<()> {
			if let Some(columns) = columns {
				let documents = columns
					.into_iter()
					.map(|column| {
						NewDocument::new(column.body)
							.with_id(column.id)
							.with_parent(id.0)
							.with_position(column.position)
					})
					.collect();
				self.store.insert_many(Collection::Columns, documents)?;
			}
			self.store.update(Collection::Tables, id.0, DocumentUpdate::new(previous.encode()?))?;
			Ok(())
		})();

		match result {
			Ok(()) => RollbackOutcome::Succeeded,
			Err(err) => {
				error!(table = %id, error = %err, "restoring table failed");
				RollbackOutcome::Failed(Box::new(err))
			}
		}
	}
}

fn partial_failure(table: TableId, cause: StoreError, rollback: RollbackOutcome) -> Error {
	Error::PartialFailure {
		operation: SchemaOperation::UpdateTable,
		table,
		cause,
		rollback,
	}
}
