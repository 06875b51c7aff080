//! # Tile Groups
//!
//! A tile group is a fixed-capacity, column-oriented arena of row slots. It
//! is the unit of physical allocation for a table: the table appends a new
//! group when the active one is exhausted and never destroys a group.
//!
//! ## Memory Layout
//!
//! Every column owns one contiguous area of `capacity` cells. A cell is a
//! one-byte null marker followed by the column's fixed cell width:
//!
//! ```text
//! column 0 (INT)      column 1 (DOUBLE)          column 2 (VARCHAR)
//! +---+------+        +---+----------+           +---+--------+-----+
//! | n | i32  | slot 0 | n | f64      | slot 0    | n | handle | len | slot 0
//! +---+------+        +---+----------+           +---+--------+-----+
//! | n | i32  | slot 1 | n | f64      | slot 1    | n | handle | len | slot 1
//! +---+------+        +---+----------+           +---+--------+-----+
//! |   ...    |        |     ...      |           |      ...         |
//! ```
//!
//! Variable-length values live in the group's side heap; the cell holds a
//! `u32` heap handle and a `u32` byte length.
//!
//! ## Slot Lifecycle
//!
//! ```text
//! ┌───────┐ allocate ┌──────────┐ write_row ┌────────┐ commit ┌──────┐
//! │ Empty │ ───────> │ Reserved │ ────────> │ Placed │ ─────> │ Live │
//! └───────┘          └──────────┘           └────────┘        └──────┘
//!                         │ write failed        │ mark_dead       │ mark_dead
//!                         v                     v                 v
//!                    ┌──────────────────────────────────────────────┐
//!                    │                     Dead                     │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! Slots are handed out by a bounded atomic counter (`fetch_update` that
//! refuses to pass `capacity`), so each slot is reserved by exactly one
//! caller and never reallocated.
//!
//! A Placed slot holds a complete row whose insert has not finished: `read`
//! resolves it, so the location can already be indexed, but `live_rows` and
//! `live_count` skip it. `commit` makes it Live. A Dead slot keeps its bytes
//! but is never returned by `read`.
//!
//! ## Concurrency
//!
//! Writers copy into disjoint cells of slots they reserved, without latches.
//! Readers only decode a slot after observing Placed or Live with Acquire
//! ordering, which pairs with the Release store at the end of `write_row`;
//! cells of a Placed or Live slot are never written again. The side heap is
//! the only latched structure and is held for a single push or lookup.

use crate::config::CELL_NULL_MARKER_SIZE;
use crate::error::AllocationError;
use crate::schema::Schema;
use crate::storage::Location;
use crate::types::{DataType, Value};
use crate::Row;
use parking_lot::RwLock;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

const SLOT_EMPTY: u8 = 0;
const SLOT_RESERVED: u8 = 1;
const SLOT_PLACED: u8 = 2;
const SLOT_LIVE: u8 = 3;
const SLOT_DEAD: u8 = 4;

const CELL_NULL: u8 = 1;
const CELL_PRESENT: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Reserved,
    Placed,
    Live,
    Dead,
}

impl SlotState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            SLOT_RESERVED => SlotState::Reserved,
            SLOT_PLACED => SlotState::Placed,
            SLOT_LIVE => SlotState::Live,
            SLOT_DEAD => SlotState::Dead,
            _ => SlotState::Empty,
        }
    }
}

/// One column's cell area.
struct ColumnArea {
    data_type: DataType,
    stride: usize,
    cells: Box<[UnsafeCell<u8>]>,
}

impl ColumnArea {
    fn new(data_type: DataType, capacity: usize) -> Result<Self, AllocationError> {
        let stride = CELL_NULL_MARKER_SIZE + data_type.cell_size();
        let bytes = stride * capacity;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(bytes)
            .map_err(|_| AllocationError::OutOfMemory { bytes })?;
        cells.extend((0..bytes).map(|_| UnsafeCell::new(0u8)));
        Ok(Self {
            data_type,
            stride,
            cells: cells.into_boxed_slice(),
        })
    }

    fn base(&self) -> *mut u8 {
        UnsafeCell::raw_get(self.cells.as_ptr())
    }

    /// # Safety
    ///
    /// The caller must hold the reservation for `slot` and the slot must not
    /// be Placed yet, so no reader or other writer touches this cell.
    unsafe fn write_cell(&self, slot: usize, cell: &[u8]) {
        debug_assert_eq!(cell.len(), self.stride);
        let dst = self.base().add(slot * self.stride);
        std::ptr::copy_nonoverlapping(cell.as_ptr(), dst, self.stride);
    }

    /// # Safety
    ///
    /// The caller must have observed `slot` as Placed or Live with Acquire
    /// ordering.
    unsafe fn cell(&self, slot: usize) -> &[u8] {
        let src = self.base().add(slot * self.stride);
        std::slice::from_raw_parts(src, self.stride)
    }
}

/// Fixed-capacity column-major block of row slots.
pub struct TileGroup {
    id: u32,
    capacity: usize,
    schema: Arc<Schema>,
    columns: Box<[ColumnArea]>,
    heap: RwLock<Vec<Box<str>>>,
    next_slot: AtomicUsize,
    states: Box<[AtomicU8]>,
    txn_ids: Box<[AtomicU64]>,
    live_count: AtomicUsize,
}

// SAFETY: cell areas are only written through slots reserved by exactly one
// thread (bounded atomic counter) and only read after an Acquire load observes
// the Release-published Placed state. Placed and Live cells are immutable.
unsafe impl Sync for TileGroup {}

impl TileGroup {
    pub fn new(id: u32, schema: Arc<Schema>, capacity: usize) -> Result<Self, AllocationError> {
        let columns = schema
            .columns()
            .iter()
            .map(|c| ColumnArea::new(c.data_type(), capacity))
            .collect::<Result<Vec<_>, _>>()?;

        let mut states = Vec::new();
        states
            .try_reserve_exact(capacity)
            .map_err(|_| AllocationError::OutOfMemory { bytes: capacity })?;
        states.extend((0..capacity).map(|_| AtomicU8::new(SLOT_EMPTY)));

        let mut txn_ids = Vec::new();
        txn_ids
            .try_reserve_exact(capacity)
            .map_err(|_| AllocationError::OutOfMemory {
                bytes: capacity * std::mem::size_of::<u64>(),
            })?;
        txn_ids.extend((0..capacity).map(|_| AtomicU64::new(0)));

        Ok(Self {
            id,
            capacity,
            schema,
            columns: columns.into_boxed_slice(),
            heap: RwLock::new(Vec::new()),
            next_slot: AtomicUsize::new(0),
            states: states.into_boxed_slice(),
            txn_ids: txn_ids.into_boxed_slice(),
            live_count: AtomicUsize::new(0),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots handed out so far; never exceeds `capacity`.
    pub fn allocated(&self) -> usize {
        self.next_slot.load(Ordering::Acquire)
    }

    pub fn live_count(&self) -> usize {
        self.live_count.load(Ordering::Acquire)
    }

    pub fn is_full(&self) -> bool {
        self.allocated() >= self.capacity
    }

    /// Reserves the next free slot, or `None` once the group is exhausted.
    pub fn allocate_slot(&self) -> Option<u32> {
        let cap = self.capacity;
        let slot = self
            .next_slot
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < cap).then_some(n + 1)
            })
            .ok()?;
        self.states[slot].store(SLOT_RESERVED, Ordering::Relaxed);
        Some(slot as u32)
    }

    /// Copies `row` into a reserved slot and publishes it as Placed.
    ///
    /// `row` must already conform to the schema (arity, types, nullability);
    /// the insert path guarantees this through `ConstraintValidator`.
    pub fn write_row(&self, slot: u32, row: &Row, txn_id: u64) -> Result<Location, AllocationError> {
        let idx = slot as usize;
        debug_assert_eq!(
            self.states[idx].load(Ordering::Relaxed),
            SLOT_RESERVED,
            "write_row on a slot that was not reserved"
        );

        let mut cell = [0u8; 16];
        for (col, area) in self.columns.iter().enumerate() {
            let buf = &mut cell[..area.stride];
            buf.fill(0);
            let value = row.get(col).unwrap_or(&Value::Null);
            let present = match (value, area.data_type) {
                (Value::Null, _) => false,
                (Value::Text(s), DataType::Varchar) => match self.heap_push(s) {
                    Ok(handle) => {
                        buf[1..5].copy_from_slice(&handle);
                        buf[5..9].copy_from_slice(&(s.len() as u32).to_le_bytes());
                        true
                    }
                    Err(err) => {
                        self.states[idx].store(SLOT_DEAD, Ordering::Release);
                        return Err(err);
                    }
                },
                (value, data_type) => value.encode_fixed(data_type, &mut buf[1..]),
            };
            debug_assert!(
                present || value.is_null(),
                "value {} does not fit column type {}",
                value,
                area.data_type
            );
            buf[0] = if present { CELL_PRESENT } else { CELL_NULL };
            // SAFETY: the slot was reserved by this caller via allocate_slot
            // and is not yet Placed, so nobody else reads or writes this cell.
            unsafe { area.write_cell(idx, buf) };
        }

        self.txn_ids[idx].store(txn_id, Ordering::Relaxed);
        self.states[idx].store(SLOT_PLACED, Ordering::Release);
        tracing::trace!(group = self.id, slot, txn_id, "row placed");
        Ok(Location::new(self.id, slot))
    }

    fn heap_push(&self, s: &str) -> Result<[u8; 4], AllocationError> {
        if s.len() > u32::MAX as usize {
            return Err(AllocationError::HeapExhausted { group_id: self.id });
        }
        let mut heap = self.heap.write();
        let handle = u32::try_from(heap.len())
            .map_err(|_| AllocationError::HeapExhausted { group_id: self.id })?;
        heap.try_reserve(1).map_err(|_| AllocationError::OutOfMemory {
            bytes: s.len(),
        })?;
        heap.push(s.into());
        Ok(handle.to_le_bytes())
    }

    pub fn slot_state(&self, slot: u32) -> Option<SlotState> {
        self.states
            .get(slot as usize)
            .map(|s| SlotState::from_raw(s.load(Ordering::Acquire)))
    }

    /// Transaction id recorded when the slot was written.
    pub fn txn_id(&self, slot: u32) -> Option<u64> {
        match self.slot_state(slot)? {
            SlotState::Placed | SlotState::Live | SlotState::Dead => {
                Some(self.txn_ids[slot as usize].load(Ordering::Relaxed))
            }
            _ => None,
        }
    }

    /// Transitions a Placed slot to Live. Returns false if the slot was not
    /// Placed.
    pub fn commit(&self, slot: u32) -> bool {
        let Some(state) = self.states.get(slot as usize) else {
            return false;
        };
        let committed = state
            .compare_exchange(SLOT_PLACED, SLOT_LIVE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if committed {
            self.live_count.fetch_add(1, Ordering::AcqRel);
        }
        committed
    }

    /// Transitions a Placed or Live slot to Dead and returns the state it
    /// left, or `None` if the slot held no row (already dead, never written,
    /// or out of range).
    pub fn mark_dead(&self, slot: u32) -> Option<SlotState> {
        let state = self.states.get(slot as usize)?;
        let previous = state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                matches!(raw, SLOT_PLACED | SLOT_LIVE).then_some(SLOT_DEAD)
            })
            .ok()?;
        if previous == SLOT_LIVE {
            self.live_count.fetch_sub(1, Ordering::AcqRel);
        }
        Some(SlotState::from_raw(previous))
    }

    /// Decodes the row at `slot` if it is Placed or Live.
    pub fn read(&self, slot: u32) -> Option<Row> {
        if !matches!(self.slot_state(slot)?, SlotState::Placed | SlotState::Live) {
            return None;
        }
        let idx = slot as usize;
        let mut values = Vec::with_capacity(self.columns.len());
        for area in self.columns.iter() {
            // SAFETY: Placed or Live was observed with Acquire above; such
            // cells are never written again.
            let cell = unsafe { area.cell(idx) };
            values.push(self.decode_cell(area.data_type, cell));
        }
        Some(Row::new(values))
    }

    fn decode_cell(&self, data_type: DataType, cell: &[u8]) -> Value {
        if cell[0] == CELL_NULL {
            return Value::Null;
        }
        let payload = &cell[1..];
        if data_type.is_variable() {
            let mut handle = [0u8; 4];
            handle.copy_from_slice(&payload[..4]);
            let heap = self.heap.read();
            return heap
                .get(u32::from_le_bytes(handle) as usize)
                .map_or(Value::Null, |s| Value::Text(s.to_string()));
        }
        Value::decode_fixed(data_type, payload).unwrap_or(Value::Null)
    }

    /// Committed rows in slot order. Placed rows are skipped.
    pub fn live_rows(&self) -> impl Iterator<Item = (Location, Row)> + '_ {
        (0..self.allocated() as u32)
            .filter(move |&slot| self.slot_state(slot) == Some(SlotState::Live))
            .filter_map(move |slot| self.read(slot).map(|row| (Location::new(self.id, slot), row)))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl std::fmt::Debug for TileGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileGroup")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("allocated", &self.allocated())
            .field("live", &self.live_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(vec![
                ColumnDef::new("id", DataType::Int4).not_null(),
                ColumnDef::new("score", DataType::Float8),
                ColumnDef::new("name", DataType::Varchar),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn allocation_stops_at_capacity() {
        let group = TileGroup::new(0, schema(), 3).unwrap();
        assert_eq!(group.allocate_slot(), Some(0));
        assert_eq!(group.allocate_slot(), Some(1));
        assert_eq!(group.allocate_slot(), Some(2));
        assert_eq!(group.allocate_slot(), None);
        assert_eq!(group.allocated(), 3);
        assert!(group.is_full());
    }

    #[test]
    fn written_row_reads_back() {
        let group = TileGroup::new(4, schema(), 2).unwrap();
        let slot = group.allocate_slot().unwrap();
        assert_eq!(group.slot_state(slot), Some(SlotState::Reserved));
        assert_eq!(group.read(slot), None);

        let row = Row::new(vec![Value::Int(7), Value::Null, Value::from("seven")]);
        let loc = group.write_row(slot, &row, 42).unwrap();
        assert_eq!(loc, Location::new(4, 0));
        assert_eq!(group.slot_state(slot), Some(SlotState::Placed));
        assert_eq!(group.read(slot), Some(row.clone()));
        assert_eq!(group.txn_id(slot), Some(42));
        assert_eq!(group.live_count(), 0);
        assert_eq!(group.live_rows().count(), 0);

        assert!(group.commit(slot));
        assert!(!group.commit(slot));
        assert_eq!(group.live_count(), 1);
        assert_eq!(group.live_rows().collect::<Vec<_>>(), vec![(loc, row)]);
    }

    #[test]
    fn placed_slot_rolls_back_without_becoming_live() {
        let group = TileGroup::new(0, schema(), 2).unwrap();
        let slot = group.allocate_slot().unwrap();
        group
            .write_row(slot, &Row::new(vec![Value::Int(3), Value::Null, Value::Null]), 1)
            .unwrap();

        assert_eq!(group.mark_dead(slot), Some(SlotState::Placed));
        assert!(!group.commit(slot));
        assert_eq!(group.read(slot), None);
        assert_eq!(group.live_count(), 0);
    }

    #[test]
    fn dead_slot_is_not_readable_or_reused() {
        let group = TileGroup::new(0, schema(), 2).unwrap();
        let slot = group.allocate_slot().unwrap();
        group
            .write_row(slot, &Row::new(vec![Value::Int(1), Value::Float(1.5), Value::Null]), 1)
            .unwrap();
        assert!(group.commit(slot));

        assert_eq!(group.mark_dead(slot), Some(SlotState::Live));
        assert_eq!(group.mark_dead(slot), None);
        assert_eq!(group.read(slot), None);
        assert_eq!(group.live_count(), 0);
        assert_eq!(group.allocate_slot(), Some(1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not fit column type")]
    fn mistyped_value_is_not_stored_as_null() {
        let group = TileGroup::new(0, schema(), 1).unwrap();
        let slot = group.allocate_slot().unwrap();
        let row = Row::new(vec![Value::from("seven"), Value::Null, Value::Null]);
        let _ = group.write_row(slot, &row, 1);
    }

    #[test]
    fn unallocated_slots_are_empty() {
        let group = TileGroup::new(0, schema(), 2).unwrap();
        assert_eq!(group.slot_state(1), Some(SlotState::Empty));
        assert_eq!(group.slot_state(2), None);
        assert_eq!(group.mark_dead(1), None);
    }
}
