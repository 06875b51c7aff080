//! Per-transaction execution context.
//!
//! The storage core does not interpret transactions. A `Context` carries the
//! caller's transaction id, which is recorded in every slot the transaction
//! writes, plus counters executors update for diagnostics.

use crate::config::INVALID_TXN_ID;
use std::sync::atomic::{AtomicU64, Ordering};

pub type TxnId = u64;

#[derive(Debug)]
pub struct Context {
    txn_id: TxnId,
    attempted: AtomicU64,
    failed: AtomicU64,
}

impl Context {
    pub fn new(txn_id: TxnId) -> Self {
        Self {
            txn_id,
            attempted: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// Executions started under this context.
    pub fn attempted(&self) -> u64 {
        self.attempted.load(Ordering::Relaxed)
    }

    /// Executions that returned an error.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.attempted().saturating_sub(self.failed())
    }

    pub(crate) fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(INVALID_TXN_ID)
    }
}
