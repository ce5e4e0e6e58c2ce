// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabula_store::{BackingStore, Collection, Document, StoreError};
use tabula_type::{RESERVED_ID_KEY, RowId, TableId, Value};

use crate::{EngineConfig, schema::{SchemaRegistry, TableDef}};

mod add;
mod delete;
mod get;
mod update;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	pub id: RowId,
	pub table: TableId,
	/// Keyed by column name. Values of columns that no longer exist are
	/// kept and tagged by their stored shape.
	pub data: BTreeMap<String, Value>,
	pub version: u64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Row {
	pub fn get(&self, column: &str) -> Option<&Value> {
		self.data.get(column)
	}

	pub fn flatten(self) -> FlatRow {
		FlatRow {
			id: self.id,
			fields: self.data,
		}
	}

	pub(crate) fn decode(table: &TableDef, document: Document) -> crate::Result<Self> {
		let serde_json::Value::Object(body) = document.body else {
			return Err(StoreError::Corrupt {
				collection: Collection::Rows,
				reason: format!("row {} is not an object", document.id),
			}
			.into());
		};

		let data = body
			.iter()
			.filter(|(key, _)| key.as_str() != RESERVED_ID_KEY)
			.filter_map(|(key, value)| {
				let ty = table.column(key).map(|column| column.ty);
				Value::from_stored(value, ty).map(|value| (key.clone(), value))
			})
			.collect();

		Ok(Self {
			id: RowId(document.id),
			table: table.id,
			data,
			version: document.version,
			created_at: document.created_at,
			updated_at: document.updated_at,
		})
	}
}

/// A row as handed to consumers: its id next to its fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
	pub id: RowId,
	#[serde(flatten)]
	pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPage {
	/// Newest first.
	pub rows: Vec<FlatRow>,
	pub total: u64,
	pub page: u64,
	pub page_size: u64,
	/// Never less than 1.
	pub total_pages: u64,
}

/// Validated storage of row data for tables in a [`SchemaRegistry`].
#[derive(Debug, Clone)]
pub struct RowStore<S> {
	store: S,
	registry: SchemaRegistry<S>,
	default_page_size: u64,
	max_page_size: u64,
	update_retries: u32,
}

impl<S: BackingStore + Clone> RowStore<S> {
	pub fn new(store: S, config: &EngineConfig) -> Self {
		Self {
			registry: SchemaRegistry::new(store.clone()),
			store,
			default_page_size: config.default_page_size,
			max_page_size: config.max_page_size,
			update_retries: config.update_retries,
		}
	}
}

impl<S: BackingStore> RowStore<S> {
	pub fn registry(&self) -> &SchemaRegistry<S> {
		&self.registry
	}
}

pub(crate) fn encode_data(data: &BTreeMap<String, Value>) -> serde_json::Value {
	serde_json::Value::Object(data.iter().map(|(key, value)| (key.clone(), value.to_json())).collect())
}
