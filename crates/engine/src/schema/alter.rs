// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use tabula_store::{BackingStore, Collection, DocumentUpdate, NewDocument};
use tabula_type::{ColumnId, TableId};
use tracing::{debug, instrument};

use crate::{
	Error, FieldError, FieldErrorKind,
	schema::{
		ColumnToCreate, SchemaRegistry, TableDef,
		create::{check_column_name, column_body, normalize_options},
		layout::{ColumnBody, TableBody},
	},
};

/// One step of an in-place schema change. Existing columns keep their ids.
/// Rows are never rewritten, so values stored under a renamed column's old
/// name become orphaned.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
	/// Appended after the last column.
	Add(ColumnToCreate),
	Remove(ColumnId),
	Rename {
		column: ColumnId,
		name: String,
	},
	SetRequired {
		column: ColumnId,
		required: bool,
	},
	/// Only valid for select columns.
	SetOptions {
		column: ColumnId,
		options: Vec<String>,
	},
}

struct Planned {
	id: ColumnId,
	body: ColumnBody,
	existing: bool,
}

impl<S: BackingStore> SchemaRegistry<S> {
	/// Applies `changes` in order. Every change is checked before anything is
	/// written.
	#[instrument(
		name = "schema::alter_columns",
		level = "debug",
		skip(self, changes),
		fields(table = %id, changes = changes.len())
	)]
	pub fn alter_columns(&self, id: TableId, changes: Vec<ColumnChange>) -> crate::Result<TableDef> {
		let table = self.get_table(id)?;

		let mut planned: Vec<Planned> = table
			.columns
			.iter()
			.map(|column| Planned {
				id: column.id,
				body: ColumnBody::from(column),
				existing: true,
			})
			.collect();
		let mut removed = vec![];
		let mut errors = vec![];

		for change in changes {
			match change {
				ColumnChange::Add(column) => {
					let mut taken = names_except(&planned, None);
					let before = errors.len();
					check_column_name(planned.len(), &column.name, &mut taken, &mut errors);
					if errors.len() == before {
						planned.push(Planned {
							id: ColumnId::generate(),
							body: column_body(&column),
							existing: false,
						});
					}
				}
				ColumnChange::Remove(column) => {
					let index = find(&planned, column)?;
					let column = planned.remove(index);
					if column.existing {
						removed.push(column.id);
					}
				}
				ColumnChange::Rename {
					column,
					name,
				} => {
					let index = find(&planned, column)?;
					let mut taken = names_except(&planned, Some(index));
					let before = errors.len();
					check_column_name(index, &name, &mut taken, &mut errors);
					if errors.len() == before {
						planned[index].body.name = name.trim().to_string();
					}
				}
				ColumnChange::SetRequired {
					column,
					required,
				} => {
					let index = find(&planned, column)?;
					planned[index].body.required = required;
				}
				ColumnChange::SetOptions {
					column,
					options,
				} => {
					let index = find(&planned, column)?;
					let body = &mut planned[index].body;
					if body.ty.has_options() {
						body.options = normalize_options(body.ty, &options);
					} else {
						errors.push(FieldError::new(
							format!("column '{}'", body.name),
							FieldErrorKind::OptionsNotApplicable,
						));
					}
				}
			}
		}

		if planned.is_empty() {
			errors.push(FieldError::new("columns", FieldErrorKind::Empty));
		}
		if !errors.is_empty() {
			return Err(Error::validation(errors));
		}

		for column in &removed {
			self.store.delete(Collection::Columns, column.0)?;
		}

		let mut next_position = table.columns.iter().map(|column| column.position).max().map_or(0, |p| p + 1);
		let mut added = vec![];
		for column in planned {
			if column.existing {
				let unchanged = table.column_by_id(column.id).is_some_and(|c| ColumnBody::from(c) == column.body);
				if !unchanged {
					self.store.update(Collection::Columns, column.id.0, DocumentUpdate::new(column.body.encode()?))?;
				}
			} else {
				added.push(
					NewDocument::new(column.body.encode()?)
						.with_id(column.id.0)
						.with_parent(id.0)
						.with_position(next_position),
				);
				next_position += 1;
			}
		}
		if !added.is_empty() {
			self.store.insert_many(Collection::Columns, added)?;
		}

		let header = TableBody {
			name: table.name,
			description: table.description,
			is_public: table.is_public,
		};
		self.store.update(Collection::Tables, id.0, DocumentUpdate::new(header.encode()?))?;

		debug!(table = %id, removed = removed.len(), "columns altered");
		self.get_table(id)
	}
}

fn find(planned: &[Planned], column: ColumnId) -> crate::Result<usize> {
	planned.iter().position(|p| p.id == column).ok_or_else(|| Error::column_not_found(column))
}

fn names_except(planned: &[Planned], skip: Option<usize>) -> BTreeSet<String> {
	planned
		.iter()
		.enumerate()
		.filter(|(index, _)| Some(*index) != skip)
		.map(|(_, column)| column.body.name.clone())
		.collect()
}
