// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
	/// Table definitions.
	Tables,
	/// Column definitions, parent is the table.
	Columns,
	/// Row payloads, parent is the table.
	Rows,
}

impl Collection {
	pub const ALL: [Collection; 3] = [Collection::Tables, Collection::Columns, Collection::Rows];

	pub fn name(&self) -> &'static str {
		match self {
			Collection::Tables => "tables",
			Collection::Columns => "columns",
			Collection::Rows => "rows",
		}
	}

	/// Collection the `parent` of a document must exist in.
	pub fn parent(&self) -> Option<Collection> {
		match self {
			Collection::Tables => None,
			Collection::Columns | Collection::Rows => Some(Collection::Tables),
		}
	}

	/// Collections whose documents are removed together with their parent.
	pub fn dependents(&self) -> &'static [Collection] {
		match self {
			Collection::Tables => &[Collection::Columns, Collection::Rows],
			Collection::Columns | Collection::Rows => &[],
		}
	}
}

impl Display for Collection {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}
