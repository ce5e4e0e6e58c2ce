// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! User-defined tables on top of a collection-style backing store.
//!
//! [`SchemaRegistry`] owns table definitions, [`RowStore`] owns row data and
//! [`validate`] decides what a row may contain. [`Engine`] wires the two
//! services to one store.

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod config;
mod error;
pub mod row;
pub mod schema;
pub mod validate;

pub use config::{DEFAULT_PAGE_SIZE, EngineConfig, MAX_PAGE_SIZE, UPDATE_RETRIES};
pub use error::{
	ConfigError, Error, FieldError, FieldErrorKind, ObjectKind, RollbackOutcome, SchemaOperation, ValidationError,
};
pub use row::{FlatRow, Row, RowPage, RowStore};
pub use schema::{
	ColumnChange, ColumnDef, ColumnToCreate, RepairReport, SchemaRegistry, TableDef, TableToCreate, TableUpdate,
};
use tabula_store::{Backend, BackingStore};
pub use tabula_type::{ColumnId, ColumnType, Fields, RowId, TableId, Value, fields};
use tracing::{info, instrument};

pub type Result<T> = std::result::Result<T, Error>;

pub struct Engine<S> {
	registry: SchemaRegistry<S>,
	rows: RowStore<S>,
}

impl<S: BackingStore + Clone> Engine<S> {
	pub fn new(store: S, config: &EngineConfig) -> Self {
		Self {
			registry: SchemaRegistry::new(store.clone()),
			rows: RowStore::new(store, config),
		}
	}

	pub fn registry(&self) -> &SchemaRegistry<S> {
		&self.registry
	}

	pub fn rows(&self) -> &RowStore<S> {
		&self.rows
	}

	pub fn store(&self) -> &S {
		self.registry.store()
	}
}

impl Engine<Backend> {
	#[instrument(name = "engine::open", level = "info", skip(config))]
	pub fn open(config: EngineConfig) -> Result<Self> {
		config.check()?;
		let store = Backend::from_config(config.backend.clone())?;
		info!(backend = store.kind(), "engine opened");
		Ok(Self::new(store, &config))
	}

	/// An engine over a fresh in-memory store with default settings.
	pub fn testing_memory() -> Self {
		Self::new(Backend::memory(), &EngineConfig::default())
	}
}
