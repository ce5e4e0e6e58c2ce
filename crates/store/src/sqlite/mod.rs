// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! SQLite implementation of the backing store.
//!
//! Each collection is one SQLite table. Children reference their table
//! definition through a foreign key with `ON DELETE CASCADE`, so removing a
//! definition is a single statement.

mod config;
mod schema;
mod storage;

pub use config::{DbPath, JournalMode, SqliteConfig, SynchronousMode};
pub use storage::SqliteBackend;
