// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Table layout of the SQLite backend.

use crate::Collection;

pub(super) fn table_name(collection: Collection) -> &'static str {
	match collection {
		Collection::Tables => "tabula_tables",
		Collection::Columns => "tabula_columns",
		Collection::Rows => "tabula_rows",
	}
}

/// Idempotent; `seq` keeps insertion order for tie breaking.
pub(super) const MIGRATION: &str = "
BEGIN;
CREATE TABLE IF NOT EXISTS tabula_tables (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT    NOT NULL UNIQUE,
    parent     TEXT,
    position   INTEGER NOT NULL DEFAULT 0,
    version    INTEGER NOT NULL,
    created_at TEXT    NOT NULL,
    updated_at TEXT    NOT NULL,
    body       TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS tabula_columns (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT    NOT NULL UNIQUE,
    parent     TEXT    NOT NULL REFERENCES tabula_tables(id) ON DELETE CASCADE,
    position   INTEGER NOT NULL DEFAULT 0,
    version    INTEGER NOT NULL,
    created_at TEXT    NOT NULL,
    updated_at TEXT    NOT NULL,
    body       TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS tabula_columns_parent ON tabula_columns(parent, position);

CREATE TABLE IF NOT EXISTS tabula_rows (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT    NOT NULL UNIQUE,
    parent     TEXT    NOT NULL REFERENCES tabula_tables(id) ON DELETE CASCADE,
    position   INTEGER NOT NULL DEFAULT 0,
    version    INTEGER NOT NULL,
    created_at TEXT    NOT NULL,
    updated_at TEXT    NOT NULL,
    body       TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS tabula_rows_parent ON tabula_rows(parent, created_at);
COMMIT;
";

pub(super) const COLUMNS: &str = "id, parent, position, version, created_at, updated_at, body";
