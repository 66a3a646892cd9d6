//! Balance and history table contracts
//!
//! The tables are plain key-value storage. Each single call is atomic for its
//! key, but nothing makes a read followed by a write atomic; callers that
//! read-modify-write must hold the user's lock from [`crate::lock`].
pub mod memory;
pub mod tree;

use crate::error::Result;
use crate::point::{Balance, HistoryEntry, TimeStamp, TransactionKind, UserId};
use chrono::Utc;

pub use memory::{MemoryBalanceTable, MemoryHistoryTable};
pub use tree::{SledBalanceTable, SledHistoryTable};

pub trait BalanceStore: Send + Sync {
    /// The stored balance, or a zero balance when the user has none yet.
    fn select_by_id(&self, user_id: UserId) -> Result<Balance>;

    /// Overwrites the user's balance, stamped with the write time.
    fn insert_or_update(&self, user_id: UserId, amount: i64) -> Result<Balance>;

    /// Puts back a balance exactly as it was read, timestamp included.
    fn restore(&self, balance: &Balance) -> Result<()>;
}

pub trait HistoryStore: Send + Sync {
    fn insert(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
        timestamp: TimeStamp<Utc>,
    ) -> Result<HistoryEntry>;

    /// All entries for the user in insertion order.
    fn select_all_by_user_id(&self, user_id: UserId) -> Result<Vec<HistoryEntry>>;
}
