//! # Tile Group Allocation Tests
//!
//! Roll-over from a full tile group to its successor, the configured group
//! limit, and the table's posture after allocation fails.

mod common;

use common::{id_val_def, id_val_table};
use tilestore::config::TableConfig;
use tilestore::executor::{insert, Context};
use tilestore::storage::{SlotState, TableBuilder};
use tilestore::{key, row, AllocationError, InsertError, Location};

#[test]
fn full_group_rolls_over_to_a_new_one() {
    let table = id_val_table(TableConfig::default().tile_group_capacity(3));
    let ctx = Context::new(9);

    let locations: Vec<_> = (0..7)
        .map(|id| insert(&table, &ctx, row![id, id * 10]).unwrap())
        .collect();

    assert_eq!(
        locations,
        vec![
            Location::new(0, 0),
            Location::new(0, 1),
            Location::new(0, 2),
            Location::new(1, 0),
            Location::new(1, 1),
            Location::new(1, 2),
            Location::new(2, 0),
        ]
    );
    assert_eq!(table.tile_group_count(), 3);
    assert_eq!(table.active_tile_group().id(), 2);
    assert!(table.tile_group(0).unwrap().is_full());

    let scanned: Vec<_> = table.scan().into_iter().map(|(l, _)| l).collect();
    assert_eq!(scanned, locations);
    assert_eq!(table.read(Location::new(1, 1)), Some(row![4, 40]));
    assert_eq!(table.read(Location::new(2, 1)), None);
    assert_eq!(table.read(Location::new(9, 0)), None);
}

#[test]
fn group_limit_surfaces_allocation_error() {
    let table = id_val_table(
        TableConfig::default()
            .tile_group_capacity(2)
            .max_tile_groups(Some(2)),
    );
    let ctx = Context::new(1);
    for id in 0..4 {
        insert(&table, &ctx, row![id, 0]).unwrap();
    }

    let err = insert(&table, &ctx, row![4, 0]).unwrap_err();
    assert_eq!(
        err,
        InsertError::Allocation(AllocationError::GroupLimitReached {
            table: "t".into(),
            limit: 2,
        })
    );
    assert!(!err.is_constraint_violation());

    // Nothing was indexed and existing rows stay readable.
    assert!(table.primary_index().lookup_exact(&key![4]).is_empty());
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.read(Location::new(1, 1)), Some(row![3, 0]));
    assert_eq!(table.tile_group_count(), 2);

    // Another table in the same process is unaffected.
    let other = TableBuilder::new(id_val_def()).build().unwrap();
    assert_eq!(other.tile_group_count(), 1);
}

#[test]
fn dead_slots_keep_their_location() {
    let table = id_val_table(TableConfig::default().tile_group_capacity(4));
    let ctx = Context::new(5);
    insert(&table, &ctx, row![1, 1]).unwrap();
    insert(&table, &ctx, row![1, 2]).unwrap_err();
    let next = insert(&table, &ctx, row![2, 2]).unwrap();

    assert_eq!(next, Location::new(0, 2));
    let group = table.tile_group(0).unwrap();
    assert_eq!(group.slot_state(1), Some(SlotState::Dead));
    assert_eq!(group.slot_state(2), Some(SlotState::Live));
    assert_eq!(group.slot_state(3), Some(SlotState::Empty));
    assert_eq!(group.txn_id(2), Some(5));
    assert_eq!(group.live_count(), 2);
    assert!(!table.mark_dead(Location::new(0, 1)));
}

#[test]
fn invalid_definitions_are_rejected_at_build() {
    let no_pk = tilestore::schema::TableDef::new(
        "t",
        vec![tilestore::schema::ColumnDef::new(
            "id",
            tilestore::types::DataType::Int4,
        )],
    );
    let err = TableBuilder::new(no_pk).build().unwrap_err();
    assert!(err.to_string().contains("no primary key"));

    let bad_config = TableBuilder::new(id_val_def())
        .config(TableConfig::default().index_fanout(2))
        .build()
        .unwrap_err();
    assert!(bad_config.to_string().contains("invalid config"));

    let unique_secondary = id_val_def().with_index(tilestore::schema::IndexDef::new(
        "t_val",
        vec!["val"],
        true,
    ));
    assert!(TableBuilder::new(unique_secondary).build().is_err());

    let unknown_column = id_val_def().with_index(tilestore::schema::IndexDef::new(
        "t_missing",
        vec!["missing"],
        false,
    ));
    assert!(TableBuilder::new(unknown_column).build().is_err());
}
