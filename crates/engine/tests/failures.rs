// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde_json::json;
use tabula_engine::{
	ColumnToCreate, ColumnType, Engine, EngineConfig, Error, RollbackOutcome, SchemaOperation, TableDef,
	TableToCreate, TableUpdate, Value, fields,
};
use tabula_store::{BackingStore, Collection, DocumentUpdate, memory::MemoryBackend};
use tabula_testing::{FaultyStore, Operation, init_tracing};

type Faulty = FaultyStore<MemoryBackend>;

fn engine(config: EngineConfig) -> (Engine<Faulty>, Faulty) {
	init_tracing();
	let store = FaultyStore::new(MemoryBackend::new());
	(Engine::new(store.clone(), &config), store)
}

fn inventory(engine: &Engine<Faulty>) -> TableDef {
	engine
		.registry()
		.create_table(
			TableToCreate::new("Inventory")
				.column(ColumnToCreate::new("Item", ColumnType::Text).required())
				.column(ColumnToCreate::new("Qty", ColumnType::Number))
				.column(ColumnToCreate::new("Note", ColumnType::Text)),
		)
		.unwrap()
}

#[test]
fn test_create_compensation_leaves_nothing_behind() {
	let (engine, store) = engine(EngineConfig::default());
	store.fail_next(Operation::InsertMany, Collection::Columns);

	let err = engine
		.registry()
		.create_table(TableToCreate::new("T").column(ColumnToCreate::new("A", ColumnType::Text)))
		.unwrap_err();
	assert!(matches!(
		err,
		Error::PartialFailure {
			operation: SchemaOperation::CreateTable,
			rollback: RollbackOutcome::Succeeded,
			..
		}
	));
	assert!(engine.registry().list_tables().unwrap().is_empty());
}

#[test]
fn test_failed_rollback_then_repair() {
	let (engine, store) = engine(EngineConfig::default());
	store.fail_next(Operation::InsertMany, Collection::Columns);
	store.fail_next(Operation::Delete, Collection::Tables);

	let err = engine
		.registry()
		.create_table(TableToCreate::new("T").column(ColumnToCreate::new("A", ColumnType::Text)))
		.unwrap_err();
	let Error::PartialFailure {
		table,
		rollback: RollbackOutcome::Failed(_),
		..
	} = err
	else {
		panic!("expected failed rollback, got {:?}", err);
	};
	assert!(engine.registry().get_table(table).unwrap().columns.is_empty());

	let report = engine.registry().repair().unwrap();
	assert_eq!(report.removed, vec![table]);
	assert!(engine.registry().list_tables().unwrap().is_empty());
}

#[test]
fn test_repair_keeps_rows_without_fields() {
	let (engine, store) = engine(EngineConfig::default());
	let table = engine
		.registry()
		.create_table(TableToCreate::new("Notes").column(ColumnToCreate::new("Note", ColumnType::Text)))
		.unwrap();
	let row = engine.rows().add_row(table.id, fields! { "Note" => "" }).unwrap();
	assert!(row.data.is_empty());

	store.fail_always(Operation::InsertMany, Collection::Columns);
	let err = engine
		.registry()
		.update_table(table.id, TableUpdate::new().columns(vec![ColumnToCreate::new("Body", ColumnType::Text)]))
		.unwrap_err();
	assert!(matches!(
		err,
		Error::PartialFailure {
			rollback: RollbackOutcome::Failed(_),
			..
		}
	));
	store.clear();

	let report = engine.registry().repair().unwrap();
	assert!(report.removed.is_empty());
	assert_eq!(report.unrepairable, vec![table.id]);
	assert_eq!(engine.rows().list_all_rows(table.id).unwrap().len(), 1);
}

#[test]
fn test_update_compensation_restores_columns() {
	let (engine, store) = engine(EngineConfig::default());
	let table = inventory(&engine);
	let row = engine.rows().add_row(table.id, fields! { "Item" => "Pen", "Qty" => 5 }).unwrap();

	store.fail_next(Operation::InsertMany, Collection::Columns);
	let err = engine
		.registry()
		.update_table(
			table.id,
			TableUpdate::new().public(true).columns(vec![ColumnToCreate::new("Other", ColumnType::Boolean)]),
		)
		.unwrap_err();
	assert!(matches!(
		err,
		Error::PartialFailure {
			operation: SchemaOperation::UpdateTable,
			rollback: RollbackOutcome::Succeeded,
			..
		}
	));

	let restored = engine.registry().get_table(table.id).unwrap();
	assert!(!restored.is_public);
	assert_eq!(restored.columns, table.columns);
	assert_eq!(engine.rows().get_row(table.id, row.id).unwrap().get("Qty"), Some(&Value::Number(5.0)));
}

#[test]
fn test_concurrent_update_is_merged() {
	let (engine, store) = engine(EngineConfig::default());
	let table = inventory(&engine);
	let row = engine.rows().add_row(table.id, fields! { "Item" => "Pen", "Qty" => 5 }).unwrap();

	let id = row.id;
	store.interleave(Operation::Update, Collection::Rows, 1, move |inner: &MemoryBackend| {
		inner.update(Collection::Rows, id.0, DocumentUpdate::new(json!({"Item": "Pen", "Qty": 99}))).unwrap();
	});

	let updated = engine.rows().update_row(table.id, row.id, fields! { "Note" => "blue" }).unwrap();
	assert_eq!(updated.version, 3);
	assert_eq!(updated.get("Qty"), Some(&Value::Number(99.0)));
	assert_eq!(updated.get("Note"), Some(&Value::text("blue")));
}

#[test]
fn test_update_gives_up_after_retries() {
	let (engine, store) = engine(EngineConfig::default().update_retries(2));
	let table = inventory(&engine);
	let row = engine.rows().add_row(table.id, fields! { "Item" => "Pen" }).unwrap();

	let id = row.id;
	store.interleave(Operation::Update, Collection::Rows, 10, move |inner: &MemoryBackend| {
		inner.update(Collection::Rows, id.0, DocumentUpdate::new(json!({"Item": "Pen"}))).unwrap();
	});

	let err = engine.rows().update_row(table.id, row.id, fields! { "Qty" => 1 }).unwrap_err();
	assert!(matches!(
		err,
		Error::Conflict {
			attempts: 3,
			..
		}
	));
	assert_eq!(err.diagnostic().code, "TABULA_006");
}

#[test]
fn test_store_failure_surfaces_as_backing_store_error() {
	let (engine, store) = engine(EngineConfig::default());
	let table = inventory(&engine);
	store.fail_next(Operation::Insert, Collection::Rows);

	let err = engine.rows().add_row(table.id, fields! { "Item" => "Pen" }).unwrap_err();
	assert!(matches!(err, Error::BackingStore(_)));
	assert!(err.diagnostic().help.is_some());
	assert!(engine.rows().list_all_rows(table.id).unwrap().is_empty());
}
