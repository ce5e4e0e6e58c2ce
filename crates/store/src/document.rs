// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub id: Uuid,
	pub parent: Option<Uuid>,
	/// Ordinal inside the parent; 0 where it carries no meaning.
	pub position: i64,
	/// Starts at 1, bumped by every update.
	pub version: u64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
	pub id: Option<Uuid>,
	pub parent: Option<Uuid>,
	pub position: i64,
	pub body: serde_json::Value,
}

impl NewDocument {
	pub fn new(body: serde_json::Value) -> Self {
		Self {
			id: None,
			parent: None,
			position: 0,
			body,
		}
	}

	pub fn with_id(mut self, id: Uuid) -> Self {
		self.id = Some(id);
		self
	}

	pub fn with_parent(mut self, parent: Uuid) -> Self {
		self.parent = Some(parent);
		self
	}

	pub fn with_position(mut self, position: i64) -> Self {
		self.position = position;
		self
	}

	pub(crate) fn into_document(self, now: DateTime<Utc>) -> Document {
		Document {
			id: self.id.unwrap_or_else(Uuid::now_v7),
			parent: self.parent,
			position: self.position,
			version: 1,
			created_at: now,
			updated_at: now,
			body: self.body,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpdate {
	pub body: serde_json::Value,
	pub expected_version: Option<u64>,
}

impl DocumentUpdate {
	pub fn new(body: serde_json::Value) -> Self {
		Self {
			body,
			expected_version: None,
		}
	}

	/// Only apply the update if the stored document is still at `version`.
	pub fn if_version(mut self, version: u64) -> Self {
		self.expected_version = Some(version);
		self
	}
}

/// Store timestamps carry microsecond precision so that both backends hand
/// back identical values.
pub(crate) fn now() -> DateTime<Utc> {
	Utc::now().trunc_subsecs(6)
}
