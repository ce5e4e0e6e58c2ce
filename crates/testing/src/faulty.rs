// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Backing store wrapper that injects failures and concurrent writes.

use std::sync::Arc;

use parking_lot::Mutex;
use tabula_store::{
	BackingStore, Collection, Document, DocumentUpdate, Filter, NewDocument, Page, Query, Result, StoreError,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Insert,
	InsertMany,
	Update,
	Delete,
	DeleteWhere,
	Query,
}

type Hook<S> = Box<dyn FnMut(&S) + Send>;

enum Action<S> {
	Fail,
	/// Runs against the wrapped store right before the operation proceeds.
	Interleave(Hook<S>),
}

struct Fault<S> {
	operation: Operation,
	collection: Collection,
	/// Matching calls to let through before the fault fires.
	skip: u32,
	/// `None` fires forever.
	times: Option<u32>,
	action: Action<S>,
}

pub struct FaultyStore<S> {
	inner: S,
	faults: Arc<Mutex<Vec<Fault<S>>>>,
}

impl<S: Clone> Clone for FaultyStore<S> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
			faults: self.faults.clone(),
		}
	}
}

impl<S: BackingStore> FaultyStore<S> {
	pub fn new(inner: S) -> Self {
		Self {
			inner,
			faults: Arc::new(Mutex::new(vec![])),
		}
	}

	pub fn inner(&self) -> &S {
		&self.inner
	}

	/// Fails the next matching call.
	pub fn fail_next(&self, operation: Operation, collection: Collection) {
		self.fail_nth(operation, collection, 1);
	}

	/// Fails the `nth` (1-based) matching call from now on.
	pub fn fail_nth(&self, operation: Operation, collection: Collection, nth: u32) {
		self.push(operation, collection, nth.saturating_sub(1), Some(1), Action::Fail);
	}

	/// Fails every matching call until [`FaultyStore::clear`].
	pub fn fail_always(&self, operation: Operation, collection: Collection) {
		self.push(operation, collection, 0, None, Action::Fail);
	}

	/// Runs `hook` against the wrapped store before each of the next `times`
	/// matching calls, simulating a concurrent writer.
	pub fn interleave<F>(&self, operation: Operation, collection: Collection, times: u32, hook: F)
	where
		F: FnMut(&S) + Send + 'static,
	{
		self.push(operation, collection, 0, Some(times), Action::Interleave(Box::new(hook)));
	}

	pub fn clear(&self) {
		self.faults.lock().clear();
	}

	fn push(&self, operation: Operation, collection: Collection, skip: u32, times: Option<u32>, action: Action<S>) {
		self.faults.lock().push(Fault {
			operation,
			collection,
			skip,
			times,
			action,
		});
	}

	fn check(&self, operation: Operation, collection: Collection) -> Result<()> {
		let mut faults = self.faults.lock();
		let mut result = Ok(());

		for fault in faults.iter_mut() {
			if fault.operation != operation || fault.collection != collection || fault.times == Some(0) {
				continue;
			}
			if fault.skip > 0 {
				fault.skip -= 1;
				continue;
			}
			if let Some(times) = fault.times.as_mut() {
				*times -= 1;
			}
			match &mut fault.action {
				Action::Fail => {
					result = Err(StoreError::Unavailable(format!(
						"injected failure: {:?} on '{}'",
						operation, collection
					)));
					break;
				}
				Action::Interleave(hook) => hook(&self.inner),
			}
		}

		faults.retain(|fault| fault.times != Some(0));
		result
	}
}

impl<S: BackingStore> BackingStore for FaultyStore<S> {
	fn insert(&self, collection: Collection, document: NewDocument) -> Result<Document> {
		self.check(Operation::Insert, collection)?;
		self.inner.insert(collection, document)
	}

	fn insert_many(&self, collection: Collection, documents: Vec<NewDocument>) -> Result<Vec<Document>> {
		self.check(Operation::InsertMany, collection)?;
		self.inner.insert_many(collection, documents)
	}

	fn update(&self, collection: Collection, id: Uuid, update: DocumentUpdate) -> Result<Document> {
		self.check(Operation::Update, collection)?;
		self.inner.update(collection, id, update)
	}

	fn delete(&self, collection: Collection, id: Uuid) -> Result<bool> {
		self.check(Operation::Delete, collection)?;
		self.inner.delete(collection, id)
	}

	fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64> {
		self.check(Operation::DeleteWhere, collection)?;
		self.inner.delete_where(collection, filter)
	}

	fn query(&self, collection: Collection, query: &Query) -> Result<Page> {
		self.check(Operation::Query, collection)?;
		self.inner.query(collection, query)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tabula_store::memory::MemoryBackend;

	use super::*;

	#[test]
	fn test_fail_nth_lets_earlier_calls_through() {
		let store = FaultyStore::new(MemoryBackend::new());
		store.fail_nth(Operation::Insert, Collection::Tables, 2);

		store.insert(Collection::Tables, NewDocument::new(json!({}))).unwrap();
		let err = store.insert(Collection::Tables, NewDocument::new(json!({}))).unwrap_err();
		assert!(matches!(err, StoreError::Unavailable(_)));
		store.insert(Collection::Tables, NewDocument::new(json!({}))).unwrap();
		assert_eq!(store.inner().len(Collection::Tables), 2);
	}

	#[test]
	fn test_faults_are_scoped_to_collection() {
		let store = FaultyStore::new(MemoryBackend::new());
		store.fail_always(Operation::Query, Collection::Rows);
		store.query(Collection::Tables, &Query::new(Filter::all())).unwrap();
		assert!(store.query(Collection::Rows, &Query::new(Filter::all())).is_err());
		store.clear();
		store.query(Collection::Rows, &Query::new(Filter::all())).unwrap();
	}

	#[test]
	fn test_interleave_runs_against_inner_store() {
		let store = FaultyStore::new(MemoryBackend::new());
		store.interleave(Operation::Query, Collection::Tables, 1, |inner: &MemoryBackend| {
			inner.insert(Collection::Tables, NewDocument::new(json!({ "by": "hook" }))).unwrap();
		});

		assert_eq!(store.query(Collection::Tables, &Query::new(Filter::all())).unwrap().total, 1);
		assert_eq!(store.query(Collection::Tables, &Query::new(Filter::all())).unwrap().total, 1);
	}
}
