// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Backing store contract for the table engine.
//!
//! The engine keeps three collections: table definitions, their columns and
//! their rows. Column and row documents reference their table through
//! `parent`, and removing a table document removes its children. Bodies are
//! opaque JSON; the store never looks inside them.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod backend;
mod collection;
pub mod config;
mod document;
mod error;
pub mod memory;
mod query;
pub mod sqlite;

pub use backend::Backend;
pub use collection::Collection;
pub use config::BackendConfig;
pub use document::{Document, DocumentUpdate, NewDocument};
pub use error::StoreError;
pub use query::{Direction, Filter, Order, OrderBy, Page, Query, Range};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Collection-style persistence the engine delegates durability to.
pub trait BackingStore: Send + Sync {
	/// Stores one document. The id is generated unless the caller supplies
	/// one; timestamps are always set by the store.
	fn insert(&self, collection: Collection, document: NewDocument) -> Result<Document>;

	/// Stores all documents or none of them.
	fn insert_many(&self, collection: Collection, documents: Vec<NewDocument>) -> Result<Vec<Document>>;

	/// Replaces the body of a document and bumps its version. Fails with
	/// [`StoreError::Conflict`] when `expected_version` is set and stale.
	fn update(&self, collection: Collection, id: Uuid, update: DocumentUpdate) -> Result<Document>;

	/// Returns whether a document was removed. Removing a table document
	/// removes its columns and rows.
	fn delete(&self, collection: Collection, id: Uuid) -> Result<bool>;

	/// Returns the number of removed documents.
	fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64>;

	/// `total` counts every document matching the filter, ignoring the range.
	fn query(&self, collection: Collection, query: &Query) -> Result<Page>;

	fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>> {
		let page = self.query(collection, &Query::new(Filter::id(id)))?;
		Ok(page.items.into_iter().next())
	}
}
