// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, ffi, params, params_from_iter};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
	SqliteConfig,
	schema::{COLUMNS, MIGRATION, table_name},
};
use crate::{
	BackingStore, Collection, Direction, Document, DocumentUpdate, Filter, NewDocument, OrderBy, Page, Query,
	Result, StoreError, document::now,
};

/// SQLite-based backing store.
///
/// A single connection guarded by a mutex serves reads and writes; every
/// multi-statement operation runs inside its own SQLite transaction.
#[derive(Clone)]
pub struct SqliteBackend {
	inner: Arc<SqliteBackendInner>,
}

struct SqliteBackendInner {
	conn: Mutex<Connection>,
	config: SqliteConfig,
}

impl SqliteBackend {
	#[instrument(name = "store::sqlite::new", level = "info", skip(config), fields(
		db_path = ?config.path,
		journal_mode = %config.journal_mode.as_str(),
		migrate = config.migrate
	))]
	pub fn new(config: SqliteConfig) -> Result<Self> {
		let conn = match config.path.resolve() {
			Some(path) => Connection::open(path)?,
			None => Connection::open_in_memory()?,
		};

		conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
		conn.pragma_update(None, "foreign_keys", "ON")?;
		conn.pragma_update_and_check(None, "journal_mode", config.journal_mode.as_str(), |row| {
			row.get::<_, String>(0)
		})?;
		conn.pragma_update(None, "synchronous", config.synchronous_mode.as_str())?;

		let backend = Self {
			inner: Arc::new(SqliteBackendInner {
				conn: Mutex::new(conn),
				config,
			}),
		};

		if backend.inner.config.migrate {
			backend.migrate()?;
		}

		Ok(backend)
	}

	/// In-memory database for testing.
	pub fn in_memory() -> Result<Self> {
		Self::new(SqliteConfig::in_memory())
	}

	pub fn config(&self) -> &SqliteConfig {
		&self.inner.config
	}

	/// Creates the collection tables. Safe to run repeatedly.
	#[instrument(name = "store::sqlite::migrate", level = "info", skip(self))]
	pub fn migrate(&self) -> Result<()> {
		self.inner.conn.lock().execute_batch(MIGRATION)?;
		debug!("sqlite collections ready");
		Ok(())
	}
}

impl BackingStore for SqliteBackend {
	#[instrument(name = "store::sqlite::insert", level = "trace", skip(self, document), fields(collection = %collection))]
	fn insert(&self, collection: Collection, document: NewDocument) -> Result<Document> {
		let document = document.into_document(now());
		let conn = self.inner.conn.lock();
		insert_document(&conn, collection, &document)?;
		Ok(document)
	}

	#[instrument(name = "store::sqlite::insert_many", level = "trace", skip(self, documents), fields(collection = %collection, count = documents.len()))]
	fn insert_many(&self, collection: Collection, documents: Vec<NewDocument>) -> Result<Vec<Document>> {
		let now = now();
		let documents: Vec<Document> = documents.into_iter().map(|document| document.into_document(now)).collect();

		let mut conn = self.inner.conn.lock();
		let tx = conn.transaction()?;
		for document in &documents {
			insert_document(&tx, collection, document)?;
		}
		tx.commit()?;

		Ok(documents)
	}

	#[instrument(name = "store::sqlite::update", level = "trace", skip(self, update), fields(collection = %collection, id = %id))]
	fn update(&self, collection: Collection, id: Uuid, update: DocumentUpdate) -> Result<Document> {
		let table = table_name(collection);
		let mut conn = self.inner.conn.lock();
		let tx = conn.transaction()?;

		let current: Option<i64> = tx
			.query_row(&format!("SELECT version FROM {} WHERE id = ?1", table), [id.to_string()], |row| row.get(0))
			.optional()
			.map_err(|err| map_error(collection, None, None, err))?;

		let Some(current) = current else {
			return Err(StoreError::NotFound {
				collection,
				id,
			});
		};
		let current = current as u64;

		if let Some(expected) = update.expected_version {
			if expected != current {
				return Err(StoreError::Conflict {
					collection,
					id,
					expected,
					actual: current,
				});
			}
		}

		tx.execute(
			&format!("UPDATE {} SET body = ?1, version = ?2, updated_at = ?3 WHERE id = ?4", table),
			params![serde_json::to_string(&update.body)?, (current + 1) as i64, encode_time(&now()), id.to_string()],
		)
		.map_err(|err| map_error(collection, None, Some(id), err))?;

		let document = tx
			.query_row(&format!("SELECT {} FROM {} WHERE id = ?1", COLUMNS, table), [id.to_string()], read_raw)
			.map_err(|err| map_error(collection, None, Some(id), err))?
			.decode(collection)?;

		tx.commit()?;
		Ok(document)
	}

	#[instrument(name = "store::sqlite::delete", level = "trace", skip(self), fields(collection = %collection, id = %id))]
	fn delete(&self, collection: Collection, id: Uuid) -> Result<bool> {
		Ok(self.delete_where(collection, &Filter::id(id))? > 0)
	}

	#[instrument(name = "store::sqlite::delete_where", level = "trace", skip(self), fields(collection = %collection))]
	fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64> {
		let (clause, values) = where_clause(filter);
		let conn = self.inner.conn.lock();
		let removed = conn
			.execute(&format!("DELETE FROM {}{}", table_name(collection), clause), params_from_iter(values.iter()))
			.map_err(|err| map_error(collection, None, None, err))?;
		Ok(removed as u64)
	}

	#[instrument(name = "store::sqlite::query", level = "trace", skip(self), fields(collection = %collection))]
	fn query(&self, collection: Collection, query: &Query) -> Result<Page> {
		let table = table_name(collection);
		let (clause, values) = where_clause(&query.filter);

		let direction = match query.order.direction {
			Direction::Asc => "ASC",
			Direction::Desc => "DESC",
		};
		let order = match query.order.by {
			OrderBy::CreatedAt => "created_at",
			OrderBy::Position => "position",
		};
		let limit = query.range.limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
		let offset = i64::try_from(query.range.offset).unwrap_or(i64::MAX);

		let conn = self.inner.conn.lock();

		let total: i64 = conn
			.query_row(&format!("SELECT COUNT(*) FROM {}{}", table, clause), params_from_iter(values.iter()), |row| {
				row.get(0)
			})
			.map_err(|err| map_error(collection, None, None, err))?;

		let sql = format!(
			"SELECT {} FROM {}{} ORDER BY {} {}, seq {} LIMIT {} OFFSET {}",
			COLUMNS, table, clause, order, direction, direction, limit, offset
		);
		let mut stmt = conn.prepare(&sql).map_err(|err| map_error(collection, None, None, err))?;
		let raw = stmt
			.query_map(params_from_iter(values.iter()), read_raw)
			.map_err(|err| map_error(collection, None, None, err))?
			.collect::<rusqlite::Result<Vec<_>>>()?;

		let items = raw.into_iter().map(|raw| raw.decode(collection)).collect::<Result<Vec<_>>>()?;

		Ok(Page {
			items,
			total: total as u64,
		})
	}
}

fn insert_document(conn: &Connection, collection: Collection, document: &Document) -> Result<()> {
	conn.execute(
		&format!("INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)", table_name(collection), COLUMNS),
		params![
			document.id.to_string(),
			document.parent.map(|parent| parent.to_string()),
			document.position,
			document.version as i64,
			encode_time(&document.created_at),
			encode_time(&document.updated_at),
			serde_json::to_string(&document.body)?,
		],
	)
	.map_err(|err| map_error(collection, document.parent, Some(document.id), err))?;
	Ok(())
}

fn where_clause(filter: &Filter) -> (String, Vec<String>) {
	let mut clauses = vec![];
	let mut values = vec![];

	if let Some(id) = filter.id {
		values.push(id.to_string());
		clauses.push(format!("id = ?{}", values.len()));
	}
	if let Some(parent) = filter.parent {
		values.push(parent.to_string());
		clauses.push(format!("parent = ?{}", values.len()));
	}

	if clauses.is_empty() {
		(String::new(), values)
	} else {
		(format!(" WHERE {}", clauses.join(" AND ")), values)
	}
}

fn map_error(collection: Collection, parent: Option<Uuid>, id: Option<Uuid>, err: rusqlite::Error) -> StoreError {
	if let rusqlite::Error::SqliteFailure(failure, message) = &err {
		if message.as_deref().is_some_and(|message| message.contains("no such table")) {
			return StoreError::MissingCollection {
				collection,
			};
		}

		match failure.extended_code {
			ffi::SQLITE_CONSTRAINT_FOREIGNKEY | ffi::SQLITE_CONSTRAINT_NOTNULL => {
				return StoreError::MissingParent {
					collection,
					parent,
				};
			}
			ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
				if let Some(id) = id {
					return StoreError::Duplicate {
						collection,
						id,
					};
				}
			}
			_ => {}
		}
	}
	StoreError::Sqlite(err)
}

fn encode_time(time: &DateTime<Utc>) -> String {
	time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

struct RawDocument {
	id: String,
	parent: Option<String>,
	position: i64,
	version: i64,
	created_at: String,
	updated_at: String,
	body: String,
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDocument> {
	Ok(RawDocument {
		id: row.get(0)?,
		parent: row.get(1)?,
		position: row.get(2)?,
		version: row.get(3)?,
		created_at: row.get(4)?,
		updated_at: row.get(5)?,
		body: row.get(6)?,
	})
}

impl RawDocument {
	fn decode(self, collection: Collection) -> Result<Document> {
		let corrupt = |reason: String| StoreError::Corrupt {
			collection,
			reason,
		};

		let id = Uuid::parse_str(&self.id).map_err(|err| corrupt(format!("id '{}': {}", self.id, err)))?;
		let parent = self
			.parent
			.as_deref()
			.map(Uuid::parse_str)
			.transpose()
			.map_err(|err| corrupt(format!("parent of {}: {}", id, err)))?;
		let created_at = decode_time(&self.created_at).ok_or_else(|| corrupt(format!("created_at of {}", id)))?;
		let updated_at = decode_time(&self.updated_at).ok_or_else(|| corrupt(format!("updated_at of {}", id)))?;

		Ok(Document {
			id,
			parent,
			position: self.position,
			version: self.version as u64,
			created_at,
			updated_at,
			body: serde_json::from_str(&self.body)?,
		})
	}
}

fn decode_time(text: &str) -> Option<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(text).ok().map(|time| time.with_timezone(&Utc))
}
