//! # Insert Executor Tests
//!
//! End-to-end inserts through `InsertExecutor`: validation failures, unique
//! violations with rollback, executor reuse, and a concurrent load checked
//! through both indexes.

mod common;

use common::{id_val_table, run_parallel};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tilestore::config::TableConfig;
use tilestore::executor::{insert, Context, InsertExecutor, InsertNode, InsertState};
use tilestore::schema::{ColumnDef, TableDef};
use tilestore::storage::TableBuilder;
use tilestore::types::{DataType, Value};
use tilestore::{key, row, InsertError, Location};

#[test]
fn id_val_scenario() {
    let table = id_val_table(TableConfig::default());
    let ctx = Context::new(1);
    let pkey = table.primary_index();

    let first = insert(&table, &ctx, row![1, 5]).unwrap();
    assert_eq!(pkey.lookup_range(&key![1], &key![1]), vec![first]);

    let err = insert(&table, &ctx, row![1, 9]).unwrap_err();
    assert!(matches!(err, InsertError::UniqueConstraintViolation { ref index, .. } if index == "t_pkey"));

    let second = insert(&table, &ctx, row![2, 9]).unwrap();
    assert_eq!(pkey.lookup_range(&key![1], &key![2]), vec![first, second]);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn null_insert_is_a_no_op() {
    let table = id_val_table(TableConfig::default());
    let ctx = Context::new(1);

    let err = insert(&table, &ctx, row![Value::Null, Value::Null]).unwrap_err();
    assert_eq!(
        err,
        InsertError::NullConstraintViolation {
            column: "id".into()
        }
    );
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.slot_count(), 0);
    assert!(table.indexes().iter().all(|i| i.is_empty()));
    assert!(table.scan().is_empty());
}

#[test]
fn rollback_on_primary_violation_hides_the_row() {
    let table = id_val_table(TableConfig::default());
    let ctx = Context::new(1);
    insert(&table, &ctx, row![1, 5]).unwrap();
    let before = table.row_count();

    insert(&table, &ctx, row![1, 6]).unwrap_err();

    assert_eq!(table.row_count(), before);
    assert_eq!(table.scan().len(), before);
    assert_eq!(table.read(Location::new(0, 1)), None);
    for index in table.indexes() {
        assert_eq!(index.len(), before, "index {} gained an entry", index.name());
    }
}

#[test]
fn varchar_columns_round_trip_and_respect_length() {
    let def = TableDef::new(
        "users",
        vec![
            ColumnDef::new("id", DataType::Int8),
            ColumnDef::new("name", DataType::Varchar).with_max_length(5),
            ColumnDef::new("score", DataType::Float8),
        ],
    )
    .with_primary_key(vec!["id"]);
    let table = Arc::new(TableBuilder::new(def).build().unwrap());
    let ctx = Context::new(3);

    let location = insert(&table, &ctx, row![1, "alice", 0.5]).unwrap();
    assert_eq!(table.read(location), Some(row![1, "alice", 0.5]));

    let short = insert(&table, &ctx, row![2]).unwrap();
    assert_eq!(table.read(short), Some(row![2, Value::Null, Value::Null]));

    let err = insert(&table, &ctx, row![3, "mallory"]).unwrap_err();
    assert!(matches!(err, InsertError::TypeViolation { ref column, .. } if column == "name"));
    assert_eq!(table.row_count(), 2);
}

#[test]
fn reused_executor_reports_already_executed() {
    let table = id_val_table(TableConfig::default());
    let node = InsertNode::new(Arc::clone(&table));
    let ctx = Context::new(1000);

    let mut failed = InsertExecutor::new(&node, &ctx, row![Value::Null, 1]);
    assert!(failed.execute().is_err());
    assert_eq!(failed.state(), InsertState::Failed);
    assert_eq!(failed.execute(), Err(InsertError::AlreadyExecuted));

    let mut exec = InsertExecutor::new(&node, &ctx, row![1, 2]);
    exec.execute().unwrap();
    assert_eq!(exec.execute(), Err(InsertError::AlreadyExecuted));
    assert_eq!(table.row_count(), 1);
    assert_eq!(ctx.attempted(), 2);
    assert_eq!(ctx.failed(), 1);
}

#[test]
fn parallel_load_through_both_indexes() {
    let table = id_val_table(TableConfig::default().tile_group_capacity(100).index_fanout(8));
    let node = InsertNode::new(Arc::clone(&table));
    let next_id = AtomicI64::new(0);

    run_parallel(8, |_| {
        let ctx = Context::new(1000);
        for _ in 0..500 {
            let id = next_id.fetch_add(1, Ordering::Relaxed) + 1;
            InsertExecutor::new(&node, &ctx, row![id, id + 1])
                .execute()
                .unwrap();
        }
    });

    assert_eq!(table.row_count(), 4000);
    assert_eq!(table.tile_group_count(), 40);

    let pkey = table.primary_index().lookup_range(&key![10], &key![100]);
    assert_eq!(pkey.len(), 91);

    let secondary = &table.secondary_indexes()[0];
    let sec = secondary.lookup_range(&key![10], &key![100]);
    assert_eq!(sec, pkey);
    let full = secondary.lookup_range(&key![10, 11], &key![100, 101]);
    assert_eq!(full.len(), 91);
    assert_eq!(full, pkey);

    let dump = table.to_string();
    assert!(dump.starts_with("TABLE t (id INT"));
    assert!(dump.ends_with("4000 rows"));
}
