// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Database file name used when the configured path is a directory.
pub const DEFAULT_FILE_NAME: &str = "tabula.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbPath {
	Memory,
	File(PathBuf),
}

impl DbPath {
	/// Directories resolve to `<dir>/tabula.db`.
	pub fn resolve(&self) -> Option<PathBuf> {
		match self {
			DbPath::Memory => None,
			DbPath::File(path) if path.is_dir() => Some(path.join(DEFAULT_FILE_NAME)),
			DbPath::File(path) => Some(path.clone()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
	Delete,
	Truncate,
	Persist,
	Memory,
	Wal,
	Off,
}

impl JournalMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			JournalMode::Delete => "DELETE",
			JournalMode::Truncate => "TRUNCATE",
			JournalMode::Persist => "PERSIST",
			JournalMode::Memory => "MEMORY",
			JournalMode::Wal => "WAL",
			JournalMode::Off => "OFF",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynchronousMode {
	Off,
	Normal,
	Full,
	Extra,
}

impl SynchronousMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			SynchronousMode::Off => "OFF",
			SynchronousMode::Normal => "NORMAL",
			SynchronousMode::Full => "FULL",
			SynchronousMode::Extra => "EXTRA",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
	pub path: DbPath,
	pub journal_mode: JournalMode,
	pub synchronous_mode: SynchronousMode,
	pub busy_timeout_ms: u64,
	/// Create missing collections when the backend is opened.
	pub migrate: bool,
}

impl SqliteConfig {
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: DbPath::File(path.as_ref().to_path_buf()),
			..Self::default()
		}
	}

	pub fn in_memory() -> Self {
		Self {
			path: DbPath::Memory,
			journal_mode: JournalMode::Memory,
			synchronous_mode: SynchronousMode::Off,
			..Self::default()
		}
	}

	/// Durability traded for speed; meant for tests.
	pub fn fast(path: impl AsRef<Path>) -> Self {
		Self {
			journal_mode: JournalMode::Wal,
			synchronous_mode: SynchronousMode::Off,
			..Self::new(path)
		}
	}

	pub fn migrate(mut self, migrate: bool) -> Self {
		self.migrate = migrate;
		self
	}
}

impl Default for SqliteConfig {
	fn default() -> Self {
		Self {
			path: DbPath::Memory,
			journal_mode: JournalMode::Wal,
			synchronous_mode: SynchronousMode::Normal,
			busy_timeout_ms: 5_000,
			migrate: true,
		}
	}
}
