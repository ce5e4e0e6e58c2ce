// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use tabula_store::{BackingStore, Collection, NewDocument};
use tabula_type::{ColumnType, RESERVED_ID_KEY, TableId};
use tracing::{debug, error, instrument, warn};

use crate::{
	Error, FieldError, FieldErrorKind, RollbackOutcome, SchemaOperation,
	schema::{
		SchemaRegistry, TableDef,
		layout::{ColumnBody, TableBody, table_def},
	},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnToCreate {
	pub name: String,
	pub ty: ColumnType,
	pub required: bool,
	/// Ignored unless `ty` is [`ColumnType::Select`].
	pub options: Vec<String>,
}

impl ColumnToCreate {
	pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
		Self {
			name: name.into(),
			ty,
			required: false,
			options: vec![],
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn options<I, T>(mut self, options: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<String>,
	{
		self.options = options.into_iter().map(Into::into).collect();
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableToCreate {
	pub name: String,
	pub description: Option<String>,
	pub is_public: bool,
	pub columns: Vec<ColumnToCreate>,
}

impl TableToCreate {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: None,
			is_public: false,
			columns: vec![],
		}
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn public(mut self) -> Self {
		self.is_public = true;
		self
	}

	pub fn column(mut self, column: ColumnToCreate) -> Self {
		self.columns.push(column);
		self
	}
}

impl<S: BackingStore> SchemaRegistry<S> {
	#[instrument(
		name = "schema::create_table",
		level = "debug",
		skip(self, to_create),
		fields(name = %to_create.name, columns = to_create.columns.len())
	)]
	pub fn create_table(&self, to_create: TableToCreate) -> crate::Result<TableDef> {
		let mut errors = vec![];
		check_table_name(&to_create.name, &mut errors);
		check_columns(&to_create.columns, &mut errors);
		if !errors.is_empty() {
			return Err(Error::validation(errors));
		}

		let table_id = TableId::generate();
		let body = TableBody {
			name: to_create.name.trim().to_string(),
			description: normalize_description(to_create.description),
			is_public: to_create.is_public,
		};
		let table = NewDocument::new(body.encode()?).with_id(table_id.0);
		let columns = column_documents(table_id, &to_create.columns)?;

		let table = self.store.insert(Collection::Tables, table)?;

		match self.store.insert_many(Collection::Columns, columns) {
			Ok(columns) => {
				debug!(table = %table_id, "table created");
				Ok(table_def(&table, &columns)?)
			}
			Err(cause) => {
				warn!(table = %table_id, error = %cause, "storing columns failed, removing table");
				let rollback = match self.store.delete(Collection::Tables, table_id.0) {
					Ok(_) => RollbackOutcome::Succeeded,
					Err(err) => {
						error!(table = %table_id, error = %err, "rollback failed, table left without columns");
						RollbackOutcome::Failed(Box::new(err))
					}
				};
				Err(Error::PartialFailure {
					operation: SchemaOperation::CreateTable,
					table: table_id,
					cause,
					rollback,
				})
			}
		}
	}
}

pub(crate) fn check_table_name(name: &str, errors: &mut Vec<FieldError>) {
	if name.trim().is_empty() {
		errors.push(FieldError::required("name"));
	}
}

pub(crate) fn check_columns(columns: &[ColumnToCreate], errors: &mut Vec<FieldError>) {
	if columns.is_empty() {
		errors.push(FieldError::new("columns", FieldErrorKind::Empty));
		return;
	}

	let mut taken = BTreeSet::new();
	for (index, column) in columns.iter().enumerate() {
		check_column_name(index, &column.name, &mut taken, errors);
	}
}

/// `taken` holds the trimmed names accepted so far.
pub(crate) fn check_column_name(
	index: usize,
	name: &str,
	taken: &mut BTreeSet<String>,
	errors: &mut Vec<FieldError>,
) {
	let name = name.trim();
	if name.is_empty() {
		errors.push(FieldError::required(format!("column {} name", index + 1)));
	} else if name == RESERVED_ID_KEY {
		errors.push(FieldError::new(format!("column name '{}'", name), FieldErrorKind::Reserved));
	} else if !taken.insert(name.to_string()) {
		errors.push(FieldError::new(format!("column name '{}'", name), FieldErrorKind::Duplicate));
	}
}

pub(crate) fn normalize_description(description: Option<String>) -> Option<String> {
	description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

/// Trimmed, without blanks or repeats; empty unless the type carries options.
pub(crate) fn normalize_options(ty: ColumnType, options: &[String]) -> Vec<String> {
	if !ty.has_options() {
		return vec![];
	}
	let mut result: Vec<String> = Vec::with_capacity(options.len());
	for option in options.iter().map(|o| o.trim()).filter(|o| !o.is_empty()) {
		if !result.iter().any(|existing| existing == option) {
			result.push(option.to_string());
		}
	}
	result
}

pub(crate) fn column_body(column: &ColumnToCreate) -> ColumnBody {
	ColumnBody {
		name: column.name.trim().to_string(),
		ty: column.ty,
		required: column.required,
		options: normalize_options(column.ty, &column.options),
	}
}

pub(crate) fn column_documents(
	table: TableId,
	columns: &[ColumnToCreate],
) -> tabula_store::Result<Vec<NewDocument>> {
	columns
		.iter()
		.enumerate()
		.map(|(position, column)| {
			Ok(NewDocument::new(column_body(column).encode()?)
				.with_parent(table.0)
				.with_position(position as i64))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use tabula_store::{StoreError, memory::MemoryBackend};
	use tabula_testing::{FaultyStore, Operation};

	use super::*;

	fn inventory() -> TableToCreate {
		TableToCreate::new("Inventory")
			.column(ColumnToCreate::new("Item", ColumnType::Text).required())
			.column(ColumnToCreate::new("Qty", ColumnType::Number))
	}

	#[test]
	fn test_create_table() {
		let registry = SchemaRegistry::new(MemoryBackend::new());
		let table = registry.create_table(inventory().description("  stock  ")).unwrap();

		assert_eq!(table.name, "Inventory");
		assert_eq!(table.description.as_deref(), Some("stock"));
		assert!(!table.is_public);
		assert_eq!(table.columns.len(), 2);
		assert_eq!(table.columns[0].name, "Item");
		assert!(table.columns[0].required);
		assert_eq!(table.columns[1].position, 1);
		assert_eq!(registry.store().len(Collection::Columns), 2);
	}

	#[test]
	fn test_blank_name_and_no_columns_are_both_reported() {
		let registry = SchemaRegistry::new(MemoryBackend::new());
		let err = registry.create_table(TableToCreate::new("   ")).unwrap_err();

		let fields: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.message()).collect();
		assert_eq!(fields, vec!["name is required", "columns must not be empty"]);
		assert!(registry.store().is_empty());
	}

	#[test]
	fn test_column_names_must_be_unique_and_not_reserved() {
		let registry = SchemaRegistry::new(MemoryBackend::new());
		let err = registry
			.create_table(
				TableToCreate::new("T")
					.column(ColumnToCreate::new("A", ColumnType::Text))
					.column(ColumnToCreate::new(" A ", ColumnType::Number))
					.column(ColumnToCreate::new("id", ColumnType::Text))
					.column(ColumnToCreate::new("", ColumnType::Text)),
			)
			.unwrap_err();

		let kinds: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.kind.clone()).collect();
		assert_eq!(kinds, vec![FieldErrorKind::Duplicate, FieldErrorKind::Reserved, FieldErrorKind::Required]);
	}

	#[test]
	fn test_options_kept_only_for_select() {
		let registry = SchemaRegistry::new(MemoryBackend::new());
		let table = registry
			.create_table(
				TableToCreate::new("Tickets")
					.column(ColumnToCreate::new("Status", ColumnType::Select).options([
						" Open", "", "Closed", "Open",
					]))
					.column(ColumnToCreate::new("Note", ColumnType::Text).options(["ignored"])),
			)
			.unwrap();

		assert_eq!(table.columns[0].options, vec!["Open", "Closed"]);
		assert!(table.columns[1].options.is_empty());
	}

	#[test]
	fn test_column_failure_removes_table() {
		let store = FaultyStore::new(MemoryBackend::new());
		store.fail_next(Operation::InsertMany, Collection::Columns);
		let registry = SchemaRegistry::new(store.clone());

		let err = registry.create_table(inventory()).unwrap_err();
		let Error::PartialFailure {
			operation,
			cause,
			rollback,
			..
		} = err
		else {
			panic!("expected partial failure, got {:?}", err);
		};
		assert_eq!(operation, SchemaOperation::CreateTable);
		assert!(matches!(cause, StoreError::Unavailable(_)));
		assert!(rollback.succeeded());
		assert!(store.inner().is_empty());
	}

	#[test]
	fn test_failed_rollback_is_reported() {
		let store = FaultyStore::new(MemoryBackend::new());
		store.fail_next(Operation::InsertMany, Collection::Columns);
		store.fail_next(Operation::Delete, Collection::Tables);
		let registry = SchemaRegistry::new(store.clone());

		let err = registry.create_table(inventory()).unwrap_err();
		let Error::PartialFailure {
			rollback,
			..
		} = &err
		else {
			panic!("expected partial failure, got {:?}", err);
		};
		assert!(matches!(rollback, RollbackOutcome::Failed(_)));
		assert_eq!(store.inner().len(Collection::Tables), 1);
		assert!(err.diagnostic().notes[0].contains("repair"));
	}
}
