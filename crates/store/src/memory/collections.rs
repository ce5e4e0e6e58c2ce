// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{Collection, Direction, Document, Filter, NewDocument, OrderBy, Page, Query, Result, StoreError};

pub(super) struct Stored {
	/// Insertion sequence, breaks ordering ties.
	pub(super) seq: u64,
	pub(super) document: Document,
}

#[derive(Default)]
pub(super) struct Collections {
	tables: BTreeMap<Uuid, Stored>,
	columns: BTreeMap<Uuid, Stored>,
	rows: BTreeMap<Uuid, Stored>,
	next_seq: u64,
}

impl Collections {
	pub(super) fn get(&self, collection: Collection) -> &BTreeMap<Uuid, Stored> {
		match collection {
			Collection::Tables => &self.tables,
			Collection::Columns => &self.columns,
			Collection::Rows => &self.rows,
		}
	}

	pub(super) fn get_mut(&mut self, collection: Collection) -> &mut BTreeMap<Uuid, Stored> {
		match collection {
			Collection::Tables => &mut self.tables,
			Collection::Columns => &mut self.columns,
			Collection::Rows => &mut self.rows,
		}
	}

	pub(super) fn check_parent(&self, collection: Collection, parent: Option<Uuid>) -> Result<()> {
		let Some(parent_collection) = collection.parent() else {
			return Ok(());
		};

		match parent {
			Some(id) if self.get(parent_collection).contains_key(&id) => Ok(()),
			_ => Err(StoreError::MissingParent {
				collection,
				parent,
			}),
		}
	}

	pub(super) fn check_insertable(&self, collection: Collection, document: &NewDocument) -> Result<()> {
		self.check_parent(collection, document.parent)?;
		if let Some(id) = document.id {
			if self.get(collection).contains_key(&id) {
				return Err(StoreError::Duplicate {
					collection,
					id,
				});
			}
		}
		Ok(())
	}

	pub(super) fn insert(&mut self, collection: Collection, document: Document) -> Document {
		let seq = self.next_seq;
		self.next_seq += 1;
		self.get_mut(collection).insert(
			document.id,
			Stored {
				seq,
				document: document.clone(),
			},
		);
		document
	}

	/// Removes matching documents and, transitively, their dependents.
	pub(super) fn remove(&mut self, collection: Collection, filter: &Filter) -> u64 {
		let ids: Vec<Uuid> = self
			.get(collection)
			.values()
			.filter(|stored| filter.matches(&stored.document))
			.map(|stored| stored.document.id)
			.collect();

		for id in &ids {
			self.get_mut(collection).remove(id);
			for dependent in collection.dependents() {
				self.remove(*dependent, &Filter::parent(*id));
			}
		}

		ids.len() as u64
	}

	pub(super) fn query(&self, collection: Collection, query: &Query) -> Page {
		let mut matching: Vec<&Stored> =
			self.get(collection).values().filter(|stored| query.filter.matches(&stored.document)).collect();

		matching.sort_by(|l, r| {
			let ordering = match query.order.by {
				OrderBy::CreatedAt => l.document.created_at.cmp(&r.document.created_at),
				OrderBy::Position => l.document.position.cmp(&r.document.position),
			}
			.then(l.seq.cmp(&r.seq));

			match query.order.direction {
				Direction::Asc => ordering,
				Direction::Desc => ordering.reverse(),
			}
		});

		let total = matching.len() as u64;
		let offset = usize::try_from(query.range.offset).unwrap_or(usize::MAX);
		let limit = query.range.limit.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

		Page {
			items: matching.into_iter().skip(offset).take(limit).map(|stored| stored.document.clone()).collect(),
			total,
		}
	}
}
