//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Barrier};
use tilestore::config::TableConfig;
use tilestore::schema::{ColumnDef, IndexDef, TableDef};
use tilestore::storage::TableBuilder;
use tilestore::types::DataType;
use tilestore::Table;

/// Runs `f(worker)` on `workers` threads that start together and returns
/// their results in worker order.
pub fn run_parallel<T, F>(workers: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let barrier = Barrier::new(workers);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let barrier = &barrier;
                let f = &f;
                s.spawn(move || {
                    barrier.wait();
                    f(worker)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect()
    })
}

/// `(id INT NOT NULL, val INT)` with a primary key on `id` and a non-unique
/// index on `(id, val)`.
pub fn id_val_def() -> TableDef {
    TableDef::new(
        "t",
        vec![
            ColumnDef::new("id", DataType::Int4).not_null(),
            ColumnDef::new("val", DataType::Int4),
        ],
    )
    .with_primary_key(vec!["id"])
    .with_index(IndexDef::new("t_id_val", vec!["id", "val"], false))
}

pub fn id_val_table(config: TableConfig) -> Arc<Table> {
    Arc::new(
        TableBuilder::new(id_val_def())
            .config(config)
            .build()
            .expect("table builds"),
    )
}
