//! In-memory tables
use super::{BalanceStore, HistoryStore};
use crate::config::TableConfig;
use crate::error::Result;
use crate::point::{Balance, HistoryEntry, TimeStamp, TransactionKind, UserId};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

fn throttle(max: Duration) {
    if max.is_zero() {
        return;
    }
    thread::sleep(rand::thread_rng().gen_range(Duration::ZERO..=max));
}

#[derive(Debug, Default)]
pub struct MemoryBalanceTable {
    table: RwLock<HashMap<UserId, Balance>>,
    config: TableConfig,
}

impl MemoryBalanceTable {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            table: RwLock::default(),
            config,
        }
    }
}

impl BalanceStore for MemoryBalanceTable {
    fn select_by_id(&self, user_id: UserId) -> Result<Balance> {
        throttle(self.config.max_read_latency);
        let stored = self.table.read().get(&user_id).cloned();
        Ok(stored.unwrap_or_else(|| Balance::empty(user_id)))
    }

    fn insert_or_update(&self, user_id: UserId, amount: i64) -> Result<Balance> {
        throttle(self.config.max_write_latency);
        let balance = Balance::create(user_id, amount, TimeStamp::now())?;
        self.table.write().insert(user_id, balance.clone());
        Ok(balance)
    }

    fn restore(&self, balance: &Balance) -> Result<()> {
        throttle(self.config.max_write_latency);
        self.table.write().insert(balance.user_id(), balance.clone());
        Ok(())
    }
}

#[derive(Debug)]
struct Ledger {
    entries: Vec<HistoryEntry>,
    cursor: u64,
}

/// Append-only ledger. Ids start at 1 and increase by one per insert.
#[derive(Debug)]
pub struct MemoryHistoryTable {
    ledger: Mutex<Ledger>,
    config: TableConfig,
}

impl Default for MemoryHistoryTable {
    fn default() -> Self {
        Self::with_config(TableConfig::default())
    }
}

impl MemoryHistoryTable {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                entries: vec![],
                cursor: 1,
            }),
            config,
        }
    }
}

impl HistoryStore for MemoryHistoryTable {
    fn insert(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
        timestamp: TimeStamp<Utc>,
    ) -> Result<HistoryEntry> {
        throttle(self.config.max_write_latency);
        let mut ledger = self.ledger.lock();
        let entry = HistoryEntry::new(ledger.cursor, user_id, amount, kind, timestamp);
        ledger.cursor += 1;
        ledger.entries.push(entry.clone());
        Ok(entry)
    }

    fn select_all_by_user_id(&self, user_id: UserId) -> Result<Vec<HistoryEntry>> {
        throttle(self.config.max_read_latency);
        let ledger = self.ledger.lock();
        Ok(ledger
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}
