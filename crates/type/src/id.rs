// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(pub Uuid);

		impl $name {
			/// Time-ordered (v7) id.
			pub fn generate() -> Self {
				Self(Uuid::now_v7())
			}

			pub fn as_uuid(&self) -> Uuid {
				self.0
			}
		}

		impl From<Uuid> for $name {
			fn from(value: Uuid) -> Self {
				Self(value)
			}
		}

		impl From<$name> for Uuid {
			fn from(value: $name) -> Self {
				value.0
			}
		}

		impl Display for $name {
			fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
				Display::fmt(&self.0, f)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Uuid::parse_str(s).map(Self)
			}
		}
	};
}

define_id!(
	/// Identifies a table definition.
	TableId
);
define_id!(
	/// Identifies one column of a table definition. Regenerated when the
	/// column set of a table is replaced wholesale.
	ColumnId
);
define_id!(
	/// Identifies one row inside a table.
	RowId
);
