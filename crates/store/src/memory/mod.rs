// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-process implementation of the backing store.
//!
//! Documents live in one BTreeMap per collection behind a single RwLock, so
//! every operation observes and produces a consistent snapshot.

mod collections;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::instrument;
use uuid::Uuid;

use self::collections::Collections;
use crate::{
	BackingStore, Collection, Document, DocumentUpdate, Filter, NewDocument, Page, Query, Result, StoreError,
	document::now,
};

#[derive(Clone, Default)]
pub struct MemoryBackend {
	inner: Arc<RwLock<Collections>>,
}

impl MemoryBackend {
	#[instrument(name = "store::memory::new", level = "debug")]
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of documents held in `collection`.
	pub fn len(&self, collection: Collection) -> usize {
		self.inner.read().get(collection).len()
	}

	pub fn is_empty(&self) -> bool {
		Collection::ALL.iter().all(|collection| self.len(*collection) == 0)
	}
}

impl BackingStore for MemoryBackend {
	#[instrument(name = "store::memory::insert", level = "trace", skip(self, document), fields(collection = %collection))]
	fn insert(&self, collection: Collection, document: NewDocument) -> Result<Document> {
		let mut guard = self.inner.write();
		guard.check_insertable(collection, &document)?;
		Ok(guard.insert(collection, document.into_document(now())))
	}

	#[instrument(name = "store::memory::insert_many", level = "trace", skip(self, documents), fields(collection = %collection, count = documents.len()))]
	fn insert_many(&self, collection: Collection, documents: Vec<NewDocument>) -> Result<Vec<Document>> {
		let mut guard = self.inner.write();
		let now = now();

		let documents: Vec<Document> = documents.into_iter().map(|document| document.into_document(now)).collect();

		// validate the whole batch before touching anything
		let mut seen = std::collections::HashSet::new();
		for document in &documents {
			guard.check_parent(collection, document.parent)?;
			if guard.get(collection).contains_key(&document.id) || !seen.insert(document.id) {
				return Err(StoreError::Duplicate {
					collection,
					id: document.id,
				});
			}
		}

		Ok(documents.into_iter().map(|document| guard.insert(collection, document)).collect())
	}

	#[instrument(name = "store::memory::update", level = "trace", skip(self, update), fields(collection = %collection, id = %id))]
	fn update(&self, collection: Collection, id: Uuid, update: DocumentUpdate) -> Result<Document> {
		let mut guard = self.inner.write();
		let Some(stored) = guard.get_mut(collection).get_mut(&id) else {
			return Err(StoreError::NotFound {
				collection,
				id,
			});
		};

		if let Some(expected) = update.expected_version {
			if stored.document.version != expected {
				return Err(StoreError::Conflict {
					collection,
					id,
					expected,
					actual: stored.document.version,
				});
			}
		}

		stored.document.body = update.body;
		stored.document.version += 1;
		stored.document.updated_at = now();
		Ok(stored.document.clone())
	}

	#[instrument(name = "store::memory::delete", level = "trace", skip(self), fields(collection = %collection, id = %id))]
	fn delete(&self, collection: Collection, id: Uuid) -> Result<bool> {
		let mut guard = self.inner.write();
		Ok(guard.remove(collection, &Filter::id(id)) > 0)
	}

	#[instrument(name = "store::memory::delete_where", level = "trace", skip(self), fields(collection = %collection))]
	fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64> {
		let mut guard = self.inner.write();
		Ok(guard.remove(collection, filter))
	}

	#[instrument(name = "store::memory::query", level = "trace", skip(self), fields(collection = %collection))]
	fn query(&self, collection: Collection, query: &Query) -> Result<Page> {
		let guard = self.inner.read();
		Ok(guard.query(collection, query))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::{Order, Range};

	fn table(store: &MemoryBackend, name: &str) -> Document {
		store.insert(Collection::Tables, NewDocument::new(json!({ "name": name }))).unwrap()
	}

	#[test]
	fn test_insert_assigns_id_version_and_timestamps() {
		let store = MemoryBackend::new();
		let doc = table(&store, "inventory");
		assert_eq!(doc.version, 1);
		assert_eq!(doc.created_at, doc.updated_at);
		assert_eq!(store.get(Collection::Tables, doc.id).unwrap(), Some(doc));
	}

	#[test]
	fn test_insert_child_requires_parent() {
		let store = MemoryBackend::new();
		let err = store
			.insert(Collection::Rows, NewDocument::new(json!({})).with_parent(Uuid::now_v7()))
			.unwrap_err();
		assert!(matches!(err, StoreError::MissingParent { .. }));

		let err = store.insert(Collection::Rows, NewDocument::new(json!({}))).unwrap_err();
		assert!(matches!(err, StoreError::MissingParent { parent: None, .. }));
	}

	#[test]
	fn test_insert_many_is_all_or_nothing() {
		let store = MemoryBackend::new();
		let parent = table(&store, "t").id;
		let id = Uuid::now_v7();
		let err = store
			.insert_many(
				Collection::Columns,
				vec![
					NewDocument::new(json!({})).with_parent(parent).with_id(id),
					NewDocument::new(json!({})).with_parent(parent).with_id(id),
				],
			)
			.unwrap_err();
		assert!(matches!(err, StoreError::Duplicate { .. }));
		assert_eq!(store.len(Collection::Columns), 0);
	}

	#[test]
	fn test_update_checks_expected_version() {
		let store = MemoryBackend::new();
		let doc = table(&store, "t");

		let updated =
			store.update(Collection::Tables, doc.id, DocumentUpdate::new(json!({"name": "u"})).if_version(1)).unwrap();
		assert_eq!(updated.version, 2);

		let err = store
			.update(Collection::Tables, doc.id, DocumentUpdate::new(json!({"name": "v"})).if_version(1))
			.unwrap_err();
		assert!(matches!(
			err,
			StoreError::Conflict {
				expected: 1,
				actual: 2,
				..
			}
		));
	}

	#[test]
	fn test_update_unknown_document() {
		let store = MemoryBackend::new();
		let err = store.update(Collection::Tables, Uuid::now_v7(), DocumentUpdate::new(json!({}))).unwrap_err();
		assert!(matches!(err, StoreError::NotFound { .. }));
	}

	#[test]
	fn test_delete_table_cascades() {
		let store = MemoryBackend::new();
		let keep = table(&store, "keep").id;
		let drop = table(&store, "drop").id;
		for parent in [keep, drop] {
			store.insert(Collection::Columns, NewDocument::new(json!({})).with_parent(parent)).unwrap();
			store.insert(Collection::Rows, NewDocument::new(json!({})).with_parent(parent)).unwrap();
		}

		assert!(store.delete(Collection::Tables, drop).unwrap());
		assert!(!store.delete(Collection::Tables, drop).unwrap());

		assert_eq!(store.len(Collection::Columns), 1);
		assert_eq!(store.len(Collection::Rows), 1);
		let rows = store.query(Collection::Rows, &Query::new(Filter::parent(drop))).unwrap();
		assert_eq!(rows.total, 0);
	}

	#[test]
	fn test_query_orders_and_windows() {
		let store = MemoryBackend::new();
		let parent = table(&store, "t").id;
		let ids: Vec<Uuid> = (0..5)
			.map(|i| {
				store.insert(Collection::Rows, NewDocument::new(json!({ "n": i })).with_parent(parent)).unwrap().id
			})
			.collect();

		let page = store
			.query(
				Collection::Rows,
				&Query::new(Filter::parent(parent)).order(Order::newest_first()).range(Range::window(1, 2)),
			)
			.unwrap();
		assert_eq!(page.total, 5);
		assert_eq!(page.items.iter().map(|d| d.id).collect::<Vec<_>>(), vec![ids[3], ids[2]]);
	}

	#[test]
	fn test_delete_where_filters_by_parent() {
		let store = MemoryBackend::new();
		let a = table(&store, "a").id;
		let b = table(&store, "b").id;
		for parent in [a, a, b] {
			store.insert(Collection::Columns, NewDocument::new(json!({})).with_parent(parent)).unwrap();
		}
		assert_eq!(store.delete_where(Collection::Columns, &Filter::parent(a)).unwrap(), 2);
		assert_eq!(store.len(Collection::Columns), 1);
	}
}
