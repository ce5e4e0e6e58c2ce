// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Unified backend enum.
//!
//! Dispatches to either the memory or the SQLite implementation so callers
//! can pick a backend from configuration without going generic.

use uuid::Uuid;

use crate::{
	BackendConfig, BackingStore, Collection, Document, DocumentUpdate, Filter, NewDocument, Page, Query, Result,
	memory::MemoryBackend,
	sqlite::{SqliteBackend, SqliteConfig},
};

#[derive(Clone)]
#[repr(u8)]
pub enum Backend {
	/// In-memory storage (non-persistent)
	Memory(MemoryBackend) = 0,
	/// SQLite-based persistent storage
	Sqlite(SqliteBackend) = 1,
}

impl Backend {
	pub fn memory() -> Self {
		Self::Memory(MemoryBackend::new())
	}

	pub fn sqlite(config: SqliteConfig) -> Result<Self> {
		Ok(Self::Sqlite(SqliteBackend::new(config)?))
	}

	pub fn sqlite_in_memory() -> Result<Self> {
		Ok(Self::Sqlite(SqliteBackend::in_memory()?))
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::Memory(_) => "memory",
			Self::Sqlite(_) => "sqlite",
		}
	}

	pub fn from_config(config: BackendConfig) -> Result<Self> {
		match config {
			BackendConfig::Memory => Ok(Self::memory()),
			BackendConfig::Sqlite(config) => Self::sqlite(config),
		}
	}
}

impl BackingStore for Backend {
	#[inline]
	fn insert(&self, collection: Collection, document: NewDocument) -> Result<Document> {
		match self {
			Self::Memory(s) => s.insert(collection, document),
			Self::Sqlite(s) => s.insert(collection, document),
		}
	}

	#[inline]
	fn insert_many(&self, collection: Collection, documents: Vec<NewDocument>) -> Result<Vec<Document>> {
		match self {
			Self::Memory(s) => s.insert_many(collection, documents),
			Self::Sqlite(s) => s.insert_many(collection, documents),
		}
	}

	#[inline]
	fn update(&self, collection: Collection, id: Uuid, update: DocumentUpdate) -> Result<Document> {
		match self {
			Self::Memory(s) => s.update(collection, id, update),
			Self::Sqlite(s) => s.update(collection, id, update),
		}
	}

	#[inline]
	fn delete(&self, collection: Collection, id: Uuid) -> Result<bool> {
		match self {
			Self::Memory(s) => s.delete(collection, id),
			Self::Sqlite(s) => s.delete(collection, id),
		}
	}

	#[inline]
	fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64> {
		match self {
			Self::Memory(s) => s.delete_where(collection, filter),
			Self::Sqlite(s) => s.delete_where(collection, filter),
		}
	}

	#[inline]
	fn query(&self, collection: Collection, query: &Query) -> Result<Page> {
		match self {
			Self::Memory(s) => s.query(collection, query),
			Self::Sqlite(s) => s.query(collection, query),
		}
	}
}
