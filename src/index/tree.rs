//! # Concurrent B+Tree
//!
//! This module implements the ordered map behind every index: a B+tree of
//! heap-allocated nodes, each guarded by its own `parking_lot::RwLock`.
//! There is no tree-wide lock on the insert or scan paths.
//!
//! ## Structure
//!
//! ```text
//!                      root pointer (RwLock<Root>: node + height)
//!                             │
//!                    [Interior: s0 | s1]
//!                    /        |        \
//!          [Leaf k<s0] [Leaf s0<=k<s1] [Leaf k>=s1]
//!               |------------>|------------>|        (next links)
//! ```
//!
//! - Interior nodes hold `n` separators and `n + 1` children; child `i`
//!   covers keys `< separators[i]`, child `i + 1` keys `>= separators[i]`
//! - Leaves hold distinct keys, each with its postings (locations in
//!   insertion order). A key never spans two leaves, so a unique check and
//!   the insert that follows it run under one leaf latch.
//! - No deletes, so nodes never merge and leaves are never unlinked.
//!
//! ## Latching Protocol
//!
//! All latches are taken top-down (root pointer, interior, leaf) or, on the
//! leaf level, left to right along `next` links. A latch on a child is
//! always acquired before the latch on its parent is released (coupling).
//!
//! | Operation | Interior latches | Leaf latch | Notes |
//! |-----------|------------------|------------|-------|
//! | scan | read, coupled | read, coupled along `next` | never holds interior latches at leaf level |
//! | insert (optimistic) | read, coupled | write | succeeds if the leaf has room or already holds the key |
//! | insert (pessimistic) | write, coupled | write | splits every full node on the way down |
//!
//! The pessimistic pass splits preemptively: a full node is split before
//! descending into it, so a split never needs to propagate upward and the
//! parent latch held during a split always has room for the new separator.
//!
//! ## Scan Guarantees
//!
//! A scan reads a leaf under its read latch and takes the next leaf's latch
//! before releasing it. An insert completed before the scan started is in
//! its leaf (or in a right sibling created by a later split, which the scan
//! still reaches through `next`), so it is observed. Entries are reported
//! once: a split only moves keys to the right of the scan position after the
//! scan left the leaf, and the scan never revisits a leaf.

use crate::index::IndexKey;
use crate::storage::Location;
use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{RawRwLock, RwLock};
use smallvec::{smallvec, SmallVec};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type NodeRef = Arc<RwLock<Node>>;
type ReadGuard = ArcRwLockReadGuard<RawRwLock, Node>;
type WriteGuard = ArcRwLockWriteGuard<RawRwLock, Node>;

pub type Postings = SmallVec<[Location; 1]>;

/// Result of a successful insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// The key was not present before.
    NewKey,
    /// The location was appended to an existing key's postings.
    Appended,
}

/// The key is already present and the caller asked for uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateKey;

enum Node {
    Leaf(Leaf),
    Interior(Interior),
}

struct Leaf {
    keys: Vec<IndexKey>,
    postings: Vec<Postings>,
    next: Option<NodeRef>,
}

struct Interior {
    separators: Vec<IndexKey>,
    children: Vec<NodeRef>,
}

struct Root {
    node: NodeRef,
    height: usize,
}

impl Node {
    fn new_ref(node: Node) -> NodeRef {
        Arc::new(RwLock::new(node))
    }

    fn len(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.keys.len(),
            Node::Interior(node) => node.separators.len(),
        }
    }

    fn is_full(&self, fanout: usize) -> bool {
        self.len() >= fanout
    }

    /// Moves the upper half of this node into a new right sibling and
    /// returns the separator for the parent.
    fn split(&mut self) -> (IndexKey, NodeRef) {
        match self {
            Node::Leaf(leaf) => {
                let mid = leaf.keys.len() / 2;
                let keys = leaf.keys.split_off(mid);
                let postings = leaf.postings.split_off(mid);
                let separator = keys[0].clone();
                let right = Node::new_ref(Node::Leaf(Leaf {
                    keys,
                    postings,
                    next: leaf.next.take(),
                }));
                leaf.next = Some(Arc::clone(&right));
                (separator, right)
            }
            Node::Interior(node) => {
                let mid = node.separators.len() / 2;
                let mut separators = node.separators.split_off(mid);
                let separator = separators.remove(0);
                let children = node.children.split_off(mid + 1);
                let right = Node::new_ref(Node::Interior(Interior {
                    separators,
                    children,
                }));
                (separator, right)
            }
        }
    }
}

impl Leaf {
    fn insert(
        &mut self,
        key: &IndexKey,
        location: Location,
        unique: bool,
    ) -> Result<InsertResult, DuplicateKey> {
        match self.keys.binary_search(key) {
            Ok(_) if unique => Err(DuplicateKey),
            Ok(idx) => {
                self.postings[idx].push(location);
                Ok(InsertResult::Appended)
            }
            Err(idx) => {
                self.keys.insert(idx, key.clone());
                self.postings.insert(idx, smallvec![location]);
                Ok(InsertResult::NewKey)
            }
        }
    }
}

impl Interior {
    fn child_index(&self, key: &IndexKey) -> usize {
        self.separators.partition_point(|s| s <= key)
    }

    fn insert_child(&mut self, idx: usize, separator: IndexKey, right: NodeRef) {
        self.separators.insert(idx, separator);
        self.children.insert(idx + 1, right);
    }
}

/// Latch-coupled concurrent B+tree from `IndexKey` to postings.
pub struct BTreeIndex {
    fanout: usize,
    root: RwLock<Root>,
    entries: AtomicUsize,
    keys: AtomicUsize,
}

impl BTreeIndex {
    pub fn new(fanout: usize) -> Self {
        debug_assert!(fanout >= crate::config::MIN_INDEX_FANOUT);
        let leaf = Node::new_ref(Node::Leaf(Leaf {
            keys: Vec::new(),
            postings: Vec::new(),
            next: None,
        }));
        Self {
            fanout,
            root: RwLock::new(Root {
                node: leaf,
                height: 1,
            }),
            entries: AtomicUsize::new(0),
            keys: AtomicUsize::new(0),
        }
    }

    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Number of levels, 1 while the root is a leaf.
    pub fn height(&self) -> usize {
        self.root.read().height
    }

    /// Number of (key, location) entries.
    pub fn len(&self) -> usize {
        self.entries.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.keys.load(Ordering::Acquire)
    }

    /// Inserts `location` under `key`. With `unique`, an existing key is
    /// rejected and the tree is left unchanged.
    pub fn insert(
        &self,
        key: &IndexKey,
        location: Location,
        unique: bool,
    ) -> Result<InsertResult, DuplicateKey> {
        let result = match self.insert_optimistic(key, location, unique) {
            Some(result) => result,
            None => self.insert_pessimistic(key, location, unique),
        }?;
        self.entries.fetch_add(1, Ordering::AcqRel);
        if result == InsertResult::NewKey {
            self.keys.fetch_add(1, Ordering::AcqRel);
        }
        Ok(result)
    }

    /// Read latches down to the leaf's parent, write latch on the leaf only.
    /// Returns `None` when the leaf would have to split.
    fn insert_optimistic(
        &self,
        key: &IndexKey,
        location: Location,
        unique: bool,
    ) -> Option<Result<InsertResult, DuplicateKey>> {
        let root = self.root.read();
        if root.height == 1 {
            let mut leaf = root.node.write_arc();
            drop(root);
            return self.insert_into_leaf_with_room(&mut leaf, key, location, unique);
        }

        let mut level = root.height;
        let mut guard: ReadGuard = root.node.read_arc();
        drop(root);

        loop {
            let child = match &*guard {
                Node::Interior(node) => Arc::clone(&node.children[node.child_index(key)]),
                Node::Leaf(_) => return None,
            };
            if level == 2 {
                let mut leaf = child.write_arc();
                drop(guard);
                return self.insert_into_leaf_with_room(&mut leaf, key, location, unique);
            }
            guard = child.read_arc();
            level -= 1;
        }
    }

    fn insert_into_leaf_with_room(
        &self,
        guard: &mut WriteGuard,
        key: &IndexKey,
        location: Location,
        unique: bool,
    ) -> Option<Result<InsertResult, DuplicateKey>> {
        let Node::Leaf(leaf) = &mut **guard else {
            return None;
        };
        if leaf.keys.len() >= self.fanout && leaf.keys.binary_search(key).is_err() {
            return None;
        }
        Some(leaf.insert(key, location, unique))
    }

    /// Write latches top-down, splitting every full node before entering it.
    fn insert_pessimistic(
        &self,
        key: &IndexKey,
        location: Location,
        unique: bool,
    ) -> Result<InsertResult, DuplicateKey> {
        let mut root = self.root.write();
        let mut guard: WriteGuard = root.node.write_arc();
        if guard.is_full(self.fanout) {
            let (separator, right) = guard.split();
            let new_root = Node::new_ref(Node::Interior(Interior {
                separators: vec![separator],
                children: vec![Arc::clone(&root.node), right],
            }));
            let new_guard = new_root.write_arc();
            root.node = new_root;
            root.height += 1;
            tracing::trace!(height = root.height, "index root split");
            guard = new_guard;
        }
        drop(root);

        loop {
            let next = match &mut *guard {
                Node::Leaf(leaf) => return leaf.insert(key, location, unique),
                Node::Interior(node) => {
                    let idx = node.child_index(key);
                    let child = Arc::clone(&node.children[idx]);
                    let mut child_guard = child.write_arc();
                    if child_guard.is_full(self.fanout) {
                        let (separator, right) = child_guard.split();
                        tracing::trace!(separator = %separator, "index node split");
                        let go_right = *key >= separator;
                        node.insert_child(idx, separator, Arc::clone(&right));
                        if go_right {
                            drop(child_guard);
                            child_guard = right.write_arc();
                        }
                    }
                    child_guard
                }
            };
            guard = next;
        }
    }

    fn descend_read(&self, key: &IndexKey) -> ReadGuard {
        let root = self.root.read();
        let mut guard: ReadGuard = root.node.read_arc();
        drop(root);
        loop {
            let child = match &*guard {
                Node::Leaf(_) => None,
                Node::Interior(node) => Some(Arc::clone(&node.children[node.child_index(key)])),
            };
            match child {
                Some(child) => guard = child.read_arc(),
                None => return guard,
            }
        }
    }

    /// Locations of every key in `[low, high]`, ascending by key, postings in
    /// insertion order. A `high` shorter than the keys includes every key it
    /// is a prefix of.
    pub fn range(&self, low: &IndexKey, high: &IndexKey) -> Vec<Location> {
        let mut out = Vec::new();
        if low.exceeds(high) {
            return out;
        }
        let mut guard = self.descend_read(low);
        loop {
            let next = match &*guard {
                Node::Interior(_) => return out,
                Node::Leaf(leaf) => {
                    let start = leaf.keys.partition_point(|k| k < low);
                    for idx in start..leaf.keys.len() {
                        if leaf.keys[idx].exceeds(high) {
                            return out;
                        }
                        out.extend_from_slice(&leaf.postings[idx]);
                    }
                    match &leaf.next {
                        Some(next) => Arc::clone(next),
                        None => return out,
                    }
                }
            };
            guard = next.read_arc();
        }
    }

    /// Postings of `key` itself, ignoring keys it is a prefix of.
    pub fn get(&self, key: &IndexKey) -> Vec<Location> {
        let guard = self.descend_read(key);
        match &*guard {
            Node::Leaf(leaf) => match leaf.keys.binary_search(key) {
                Ok(idx) => leaf.postings[idx].to_vec(),
                Err(_) => Vec::new(),
            },
            Node::Interior(_) => Vec::new(),
        }
    }

    /// All (key, postings) pairs in key order.
    pub fn entries(&self) -> Vec<(IndexKey, Postings)> {
        let mut out = Vec::new();
        let mut guard = self.descend_read(&IndexKey::default());
        loop {
            let next = match &*guard {
                Node::Interior(_) => return out,
                Node::Leaf(leaf) => {
                    out.extend(leaf.keys.iter().cloned().zip(leaf.postings.iter().cloned()));
                    match &leaf.next {
                        Some(next) => Arc::clone(next),
                        None => return out,
                    }
                }
            };
            guard = next.read_arc();
        }
    }
}
