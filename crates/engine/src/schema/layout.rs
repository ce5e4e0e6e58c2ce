// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tabula_store::{Collection, Document, StoreError};
use tabula_type::{ColumnId, ColumnType, TableId};

use crate::schema::{ColumnDef, TableDef};

/// Body of a document in [`Collection::Tables`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TableBody {
	pub(crate) name: String,
	#[serde(default)]
	pub(crate) description: Option<String>,
	#[serde(default)]
	pub(crate) is_public: bool,
}

/// Body of a document in [`Collection::Columns`]. The position lives on the
/// document itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ColumnBody {
	pub(crate) name: String,
	#[serde(rename = "type")]
	pub(crate) ty: ColumnType,
	#[serde(default)]
	pub(crate) required: bool,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub(crate) options: Vec<String>,
}

impl TableBody {
	pub(crate) fn encode(&self) -> tabula_store::Result<serde_json::Value> {
		Ok(serde_json::to_value(self)?)
	}

	pub(crate) fn decode(document: &Document) -> tabula_store::Result<Self> {
		serde_json::from_value(document.body.clone()).map_err(|err| corrupt(Collection::Tables, document, err))
	}
}

impl ColumnBody {
	pub(crate) fn encode(&self) -> tabula_store::Result<serde_json::Value> {
		Ok(serde_json::to_value(self)?)
	}

	pub(crate) fn decode(document: &Document) -> tabula_store::Result<Self> {
		serde_json::from_value(document.body.clone()).map_err(|err| corrupt(Collection::Columns, document, err))
	}
}

impl From<&ColumnDef> for ColumnBody {
	fn from(column: &ColumnDef) -> Self {
		Self {
			name: column.name.clone(),
			ty: column.ty,
			required: column.required,
			options: column.options.clone(),
		}
	}
}

pub(crate) fn column_def(document: &Document) -> tabula_store::Result<ColumnDef> {
	let body = ColumnBody::decode(document)?;
	Ok(ColumnDef {
		id: ColumnId(document.id),
		name: body.name,
		ty: body.ty,
		required: body.required,
		options: body.options,
		position: document.position,
	})
}

/// `columns` must already be ordered by position.
pub(crate) fn table_def(table: &Document, columns: &[Document]) -> tabula_store::Result<TableDef> {
	let body = TableBody::decode(table)?;
	let columns = columns.iter().map(column_def).collect::<tabula_store::Result<Vec<_>>>()?;

	Ok(TableDef {
		id: TableId(table.id),
		name: body.name,
		description: body.description,
		is_public: body.is_public,
		columns,
		created_at: table.created_at,
		updated_at: table.updated_at,
	})
}

fn corrupt(collection: Collection, document: &Document, err: serde_json::Error) -> StoreError {
	StoreError::Corrupt {
		collection,
		reason: format!("document {}: {}", document.id, err),
	}
}
