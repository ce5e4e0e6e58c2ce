// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use uuid::Uuid;

use crate::Collection;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("collection '{collection}' does not exist in the backing store")]
	MissingCollection {
		collection: Collection,
	},

	#[error("document {id} not found in '{collection}'")]
	NotFound {
		collection: Collection,
		id: Uuid,
	},

	#[error("document {id} in '{collection}' is at version {actual}, expected {expected}")]
	Conflict {
		collection: Collection,
		id: Uuid,
		expected: u64,
		actual: u64,
	},

	#[error("parent {} of a '{collection}' document does not exist", display_parent(.parent))]
	MissingParent {
		collection: Collection,
		parent: Option<Uuid>,
	},

	#[error("document {id} already exists in '{collection}'")]
	Duplicate {
		collection: Collection,
		id: Uuid,
	},

	#[error("corrupt document in '{collection}': {reason}")]
	Corrupt {
		collection: Collection,
		reason: String,
	},

	#[error("backing store unavailable: {0}")]
	Unavailable(String),

	#[error("sqlite error: {0}")]
	Sqlite(#[from] rusqlite::Error),

	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
}

impl StoreError {
	/// What an operator can do about the failure, if anything.
	pub fn remediation(&self) -> Option<String> {
		match self {
			StoreError::MissingCollection {
				collection,
			} => Some(format!(
				"the '{}' collection has not been created; apply the schema migration (enable `migrate` in the sqlite config or call `SqliteBackend::migrate`)",
				collection
			)),
			StoreError::Conflict {
				..
			} => Some("reload the document and apply the change again".to_string()),
			StoreError::Unavailable(_) => Some("check that the backing store is reachable and retry".to_string()),
			_ => None,
		}
	}
}

fn display_parent(parent: &Option<Uuid>) -> String {
	match parent {
		Some(parent) => parent.to_string(),
		None => "<none>".to_string(),
	}
}
