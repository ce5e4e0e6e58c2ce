// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::error::Error as StdError;

use tabula_engine::{
	ColumnToCreate, ColumnType, Engine, EngineConfig, Error, ObjectKind, TableToCreate, TableUpdate, Value, fields,
};
use tabula_store::{Backend, BackingStore, Collection, Filter, Query, StoreError, sqlite::SqliteConfig};
use tabula_testing::{init_tracing, tempdir::temp_dir};

fn with_sqlite(f: impl FnOnce(&Engine<Backend>)) {
	init_tracing();
	temp_dir(|path| -> Result<(), Box<dyn StdError>> {
		let engine = Engine::open(EngineConfig::sqlite(SqliteConfig::fast(path)))?;
		f(&engine);
		Ok(())
	})
	.expect("test failed")
}

fn inventory<S: BackingStore + Clone>(engine: &Engine<S>) {
	let table = engine
		.registry()
		.create_table(
			TableToCreate::new("Inventory")
				.column(ColumnToCreate::new("Item", ColumnType::Text).required())
				.column(ColumnToCreate::new("Qty", ColumnType::Number)),
		)
		.unwrap();

	let pen = engine.rows().add_row(table.id, fields! { "Item" => "Pen", "Qty" => "5" }).unwrap();
	assert_eq!(pen.get("Qty"), Some(&Value::Number(5.0)));

	let err = engine.rows().add_row(table.id, fields! { "Qty" => "abc" }).unwrap_err();
	let messages: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.message()).collect();
	assert_eq!(messages, vec!["Item is required", "Qty must be a number"]);

	let page = engine.rows().list_rows(table.id, 1, 20).unwrap();
	assert_eq!(page.total, 1);
	assert_eq!(page.total_pages, 1);
	assert_eq!(
		serde_json::to_value(&page.rows[0]).unwrap(),
		serde_json::json!({"id": pen.id.to_string(), "Item": "Pen", "Qty": 5})
	);

	engine.rows().update_row(table.id, pen.id, fields! { "Qty" => 6 }).unwrap();
	let pen = engine.rows().get_row(table.id, pen.id).unwrap();
	assert_eq!(pen.get("Item"), Some(&Value::text("Pen")));
	assert_eq!(pen.get("Qty"), Some(&Value::Number(6.0)));

	engine.rows().delete_row(table.id, pen.id).unwrap();
	assert!(engine.rows().list_all_rows(table.id).unwrap().is_empty());
}

#[test]
fn test_inventory_memory() {
	init_tracing();
	inventory(&Engine::testing_memory());
}

#[test]
fn test_inventory_sqlite() {
	with_sqlite(inventory::<Backend>);
}

fn sparse_merge<S: BackingStore + Clone>(engine: &Engine<S>) {
	let table = engine
		.registry()
		.create_table(
			TableToCreate::new("Inventory")
				.column(ColumnToCreate::new("Item", ColumnType::Text).required())
				.column(ColumnToCreate::new("Qty", ColumnType::Number)),
		)
		.unwrap();

	let err = engine.rows().add_row(table.id, fields! {}).unwrap_err();
	assert!(matches!(err, Error::Validation(_)));
	let messages: Vec<_> = err.field_errors().unwrap().iter().map(|e| e.message()).collect();
	assert_eq!(messages, vec!["Item is required"]);

	let pen = engine.rows().add_row(table.id, fields! { "Item" => "Pen" }).unwrap();
	assert_eq!(pen.get("Qty"), None);

	engine.rows().update_row(table.id, pen.id, fields! { "Qty" => 5 }).unwrap();
	let stored = engine.rows().get_row(table.id, pen.id).unwrap().flatten();
	assert_eq!(
		serde_json::to_value(&stored).unwrap(),
		serde_json::json!({"id": pen.id.to_string(), "Item": "Pen", "Qty": 5})
	);
}

#[test]
fn test_sparse_merge_memory() {
	sparse_merge(&Engine::testing_memory());
}

#[test]
fn test_sparse_merge_sqlite() {
	with_sqlite(sparse_merge::<Backend>);
}

fn delete_from_pages<S: BackingStore + Clone>(engine: &Engine<S>) {
	let table = engine
		.registry()
		.create_table(TableToCreate::new("Counter").column(ColumnToCreate::new("N", ColumnType::Number)))
		.unwrap();
	let ids: Vec<_> = (0..5).map(|n| engine.rows().add_row(table.id, fields! { "N" => n }).unwrap().id).collect();

	let listed = |engine: &Engine<S>| {
		let mut seen = vec![];
		let mut page = 1;
		loop {
			let result = engine.rows().list_rows(table.id, page, 2).unwrap();
			seen.extend(result.rows.iter().map(|row| row.id));
			if page >= result.total_pages {
				return (seen, result.total);
			}
			page += 1;
		}
	};

	let (before, total) = listed(engine);
	assert_eq!(total, 5);
	assert!(before.contains(&ids[2]));

	engine.rows().delete_row(table.id, ids[2]).unwrap();

	let (after, total) = listed(engine);
	assert_eq!(total, 4);
	assert_eq!(after.len(), 4);
	assert!(!after.contains(&ids[2]));
	assert!(matches!(engine.rows().get_row(table.id, ids[2]), Err(Error::NotFound { .. })));
}

#[test]
fn test_delete_from_pages_memory() {
	delete_from_pages(&Engine::testing_memory());
}

#[test]
fn test_delete_from_pages_sqlite() {
	with_sqlite(delete_from_pages::<Backend>);
}

fn delete_cascades<S: BackingStore + Clone>(engine: &Engine<S>) {
	let table = engine
		.registry()
		.create_table(TableToCreate::new("Notes").column(ColumnToCreate::new("Body", ColumnType::Text)))
		.unwrap();
	for n in 0..3 {
		engine.rows().add_row(table.id, fields! { "Body" => format!("note {}", n) }).unwrap();
	}

	engine.registry().delete_table(table.id).unwrap();

	assert!(matches!(
		engine.rows().list_rows(table.id, 1, 10).unwrap_err(),
		Error::NotFound {
			kind: ObjectKind::Table,
			..
		}
	));
	for collection in Collection::ALL {
		let page = engine.store().query(collection, &Query::new(Filter::all())).unwrap();
		assert_eq!(page.total, 0, "{} not empty", collection);
	}
	assert!(matches!(engine.registry().delete_table(table.id), Err(Error::NotFound { .. })));
}

#[test]
fn test_delete_cascades_memory() {
	delete_cascades(&Engine::testing_memory());
}

#[test]
fn test_delete_cascades_sqlite() {
	with_sqlite(delete_cascades::<Backend>);
}

fn schema_evolution<S: BackingStore + Clone>(engine: &Engine<S>) {
	let table = engine
		.registry()
		.create_table(
			TableToCreate::new("Tasks")
				.column(ColumnToCreate::new("Title", ColumnType::Text).required())
				.column(ColumnToCreate::new("Due", ColumnType::Date)),
		)
		.unwrap();
	let task = engine.rows().add_row(table.id, fields! { "Title" => "Ship", "Due" => "2024-03-01" }).unwrap();
	assert!(task.get("Due").unwrap().as_date().is_some());

	// rows keep values of columns that are replaced, tagged by their stored shape
	engine
		.registry()
		.update_table(table.id, TableUpdate::new().columns(vec![ColumnToCreate::new("Title", ColumnType::Text)]))
		.unwrap();

	let task = engine.rows().get_row(table.id, task.id).unwrap();
	assert_eq!(task.get("Due"), Some(&Value::text("2024-03-01T00:00:00.000Z")));

	let tables = engine.registry().list_tables().unwrap();
	assert_eq!(tables.len(), 1);
	assert_eq!(tables[0].columns.len(), 1);
	assert!(!tables[0].columns[0].required);
}

#[test]
fn test_schema_evolution_memory() {
	schema_evolution(&Engine::testing_memory());
}

#[test]
fn test_schema_evolution_sqlite() {
	with_sqlite(schema_evolution::<Backend>);
}

#[test]
fn test_sqlite_without_migration() {
	init_tracing();
	temp_dir(|path| -> Result<(), Box<dyn StdError>> {
		let engine = Engine::open(EngineConfig::sqlite(SqliteConfig::fast(path).migrate(false)))?;
		let err = engine
			.registry()
			.create_table(TableToCreate::new("T").column(ColumnToCreate::new("A", ColumnType::Text)))
			.unwrap_err();

		assert!(matches!(
			err,
			Error::BackingStore(StoreError::MissingCollection {
				collection: Collection::Tables
			})
		));
		let diagnostic = err.diagnostic();
		assert_eq!(diagnostic.code, "TABULA_004");
		assert!(diagnostic.help.is_some());
		Ok(())
	})
	.expect("test failed")
}

#[test]
fn test_sqlite_survives_reopen() {
	init_tracing();
	temp_dir(|path| -> Result<(), Box<dyn StdError>> {
		let table = {
			let engine = Engine::open(EngineConfig::sqlite(SqliteConfig::fast(path)))?;
			let table = engine
				.registry()
				.create_table(TableToCreate::new("T").public().column(ColumnToCreate::new("A", ColumnType::Boolean)))?;
			engine.rows().add_row(table.id, fields! { "A" => "yes" })?;
			table
		};

		let engine = Engine::open(EngineConfig::sqlite(SqliteConfig::fast(path)))?;
		assert_eq!(engine.registry().list_public_tables()?, vec![table.clone()]);
		let rows = engine.rows().list_all_rows(table.id)?;
		assert_eq!(rows[0].fields["A"], Value::Bool(true));
		Ok(())
	})
	.expect("test failed")
}
