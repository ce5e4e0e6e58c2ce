// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use uuid::Uuid;

use crate::Document;

/// Equality filter; unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filter {
	pub id: Option<Uuid>,
	pub parent: Option<Uuid>,
}

impl Filter {
	pub fn all() -> Self {
		Self::default()
	}

	pub fn id(id: Uuid) -> Self {
		Self {
			id: Some(id),
			parent: None,
		}
	}

	pub fn parent(parent: Uuid) -> Self {
		Self {
			id: None,
			parent: Some(parent),
		}
	}

	pub fn and_parent(mut self, parent: Uuid) -> Self {
		self.parent = Some(parent);
		self
	}

	pub fn matches(&self, document: &Document) -> bool {
		self.id.map_or(true, |id| document.id == id)
			&& self.parent.map_or(true, |parent| document.parent == Some(parent))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
	CreatedAt,
	Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Asc,
	Desc,
}

/// Ties are broken by insertion order, in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
	pub by: OrderBy,
	pub direction: Direction,
}

impl Order {
	pub fn newest_first() -> Self {
		Self {
			by: OrderBy::CreatedAt,
			direction: Direction::Desc,
		}
	}

	pub fn oldest_first() -> Self {
		Self {
			by: OrderBy::CreatedAt,
			direction: Direction::Asc,
		}
	}

	pub fn by_position() -> Self {
		Self {
			by: OrderBy::Position,
			direction: Direction::Asc,
		}
	}
}

impl Default for Order {
	fn default() -> Self {
		Self::oldest_first()
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
	pub offset: u64,
	/// `None` returns everything after `offset`.
	pub limit: Option<u64>,
}

impl Range {
	pub fn all() -> Self {
		Self::default()
	}

	pub fn window(offset: u64, limit: u64) -> Self {
		Self {
			offset,
			limit: Some(limit),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
	pub filter: Filter,
	pub order: Order,
	pub range: Range,
}

impl Query {
	pub fn new(filter: Filter) -> Self {
		Self {
			filter,
			order: Order::default(),
			range: Range::all(),
		}
	}

	pub fn order(mut self, order: Order) -> Self {
		self.order = order;
		self
	}

	pub fn range(mut self, range: Range) -> Self {
		self.range = range;
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
	pub items: Vec<Document>,
	/// Matches of the filter, ignoring the range.
	pub total: u64,
}

impl Page {
	pub fn empty() -> Self {
		Self {
			items: vec![],
			total: 0,
		}
	}
}
