// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabula_store::BackingStore;
use tabula_type::{ColumnId, ColumnType, TableId};

mod alter;
mod create;
mod delete;
mod get;
mod layout;
mod repair;
mod update;

pub use alter::ColumnChange;
pub use create::{ColumnToCreate, TableToCreate};
pub use repair::RepairReport;
pub use update::TableUpdate;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
	pub id: ColumnId,
	pub name: String,
	#[serde(rename = "type")]
	pub ty: ColumnType,
	pub required: bool,
	/// Allowed values of a select column; empty for every other type.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub options: Vec<String>,
	/// Ordering key inside the table. Starts at 0; removed columns leave gaps.
	pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDef {
	pub id: TableId,
	pub name: String,
	pub description: Option<String>,
	pub is_public: bool,
	/// Ordered by position.
	pub columns: Vec<ColumnDef>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl TableDef {
	pub fn column(&self, name: &str) -> Option<&ColumnDef> {
		self.columns.iter().find(|column| column.name == name)
	}

	pub fn column_by_id(&self, id: ColumnId) -> Option<&ColumnDef> {
		self.columns.iter().find(|column| column.id == id)
	}
}

/// Creates, reads and evolves table definitions.
#[derive(Debug, Clone)]
pub struct SchemaRegistry<S> {
	store: S,
}

impl<S: BackingStore> SchemaRegistry<S> {
	pub fn new(store: S) -> Self {
		Self {
			store,
		}
	}

	pub fn store(&self) -> &S {
		&self.store
	}
}
