// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tabula_store::{BackendConfig, sqlite::SqliteConfig};

use crate::ConfigError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 500;
pub const UPDATE_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub backend: BackendConfig,
	/// Page size used by [`crate::RowStore::list_page`].
	pub default_page_size: u64,
	pub max_page_size: u64,
	/// Extra attempts `update_row` makes after losing a race with another writer.
	pub update_retries: u32,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			backend: BackendConfig::Memory,
			default_page_size: DEFAULT_PAGE_SIZE,
			max_page_size: MAX_PAGE_SIZE,
			update_retries: UPDATE_RETRIES,
		}
	}
}

impl EngineConfig {
	pub fn memory() -> Self {
		Self::default()
	}

	pub fn sqlite(config: SqliteConfig) -> Self {
		Self {
			backend: BackendConfig::Sqlite(config),
			..Self::default()
		}
	}

	pub fn from_json(text: &str) -> crate::Result<Self> {
		let config: Self = serde_json::from_str(text).map_err(ConfigError::from)?;
		config.check()?;
		Ok(config)
	}

	/// Rejects page sizes [`crate::RowStore::list_page`] could never serve.
	pub fn check(&self) -> crate::Result<()> {
		if self.max_page_size == 0 {
			return Err(invalid("max_page_size", "must be at least 1".to_string()));
		}
		if self.default_page_size == 0 {
			return Err(invalid("default_page_size", "must be at least 1".to_string()));
		}
		if self.default_page_size > self.max_page_size {
			return Err(invalid(
				"default_page_size",
				format!("must be at most max_page_size ({})", self.max_page_size),
			));
		}
		Ok(())
	}

	pub fn update_retries(mut self, retries: u32) -> Self {
		self.update_retries = retries;
		self
	}

	pub fn page_sizes(mut self, default: u64, max: u64) -> Self {
		self.default_page_size = default;
		self.max_page_size = max;
		self
	}
}

fn invalid(field: &'static str, reason: String) -> crate::Error {
	ConfigError::Invalid {
		field,
		reason,
	}
	.into()
}
