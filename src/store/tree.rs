//! Tables backed by sled trees, records encoded as CBOR
use super::{BalanceStore, HistoryStore};
use crate::error::{Result, StoreError};
use crate::point::{Balance, HistoryEntry, TimeStamp, TransactionKind, UserId};
use chrono::Utc;
use sled::{Db, Tree};

const BALANCE_TREE: &str = "balances";
const HISTORY_TREE: &str = "histories";

#[derive(Debug, minicbor::Encode, minicbor::Decode)]
struct BalanceRecord {
    #[n(0)]
    amount: i64,
    #[n(1)]
    updated_at: TimeStamp<Utc>,
}

fn encode<T: minicbor::Encode<()>>(value: &T) -> Result<Vec<u8>> {
    minicbor::to_vec(value).map_err(|e| StoreError::Encode(e.to_string()).into())
}

pub struct SledBalanceTable {
    tree: Tree,
}

impl SledBalanceTable {
    pub fn open(db: &Db) -> Result<Self> {
        let tree = db.open_tree(BALANCE_TREE).map_err(StoreError::from)?;
        Ok(Self { tree })
    }
}

impl BalanceStore for SledBalanceTable {
    fn select_by_id(&self, user_id: UserId) -> Result<Balance> {
        let Some(raw) = self
            .tree
            .get(user_id.to_be_bytes())
            .map_err(StoreError::from)?
        else {
            return Ok(Balance::empty(user_id));
        };
        let record: BalanceRecord = minicbor::decode(&raw).map_err(StoreError::from)?;
        // stored data passes the same invariant as fresh data
        Balance::create(user_id, record.amount, record.updated_at)
    }

    fn insert_or_update(&self, user_id: UserId, amount: i64) -> Result<Balance> {
        let balance = Balance::create(user_id, amount, TimeStamp::now())?;
        self.restore(&balance)?;
        Ok(balance)
    }

    fn restore(&self, balance: &Balance) -> Result<()> {
        let record = BalanceRecord {
            amount: balance.amount(),
            updated_at: balance.updated_at().clone(),
        };
        self.tree
            .insert(balance.user_id().to_be_bytes(), encode(&record)?)
            .map_err(StoreError::from)?;
        Ok(())
    }
}

/// History keyed by `user id ++ sequence`, both big-endian, so a prefix scan
/// over one user walks their entries in insertion order.
pub struct SledHistoryTable {
    db: Db,
    tree: Tree,
}

impl SledHistoryTable {
    pub fn open(db: &Db) -> Result<Self> {
        let tree = db.open_tree(HISTORY_TREE).map_err(StoreError::from)?;
        Ok(Self {
            db: db.clone(),
            tree,
        })
    }
}

fn history_key(user_id: UserId, seq: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&user_id.to_be_bytes());
    key[8..].copy_from_slice(&seq.to_be_bytes());
    key
}

impl HistoryStore for SledHistoryTable {
    fn insert(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
        timestamp: TimeStamp<Utc>,
    ) -> Result<HistoryEntry> {
        // generate_id counts from zero, ids are 1-based like the memory table
        let seq = self.db.generate_id().map_err(StoreError::from)? + 1;
        let entry = HistoryEntry::new(seq, user_id, amount, kind, timestamp);
        self.tree
            .insert(history_key(user_id, seq), encode(&entry)?)
            .map_err(StoreError::from)?;
        Ok(entry)
    }

    fn select_all_by_user_id(&self, user_id: UserId) -> Result<Vec<HistoryEntry>> {
        let mut entries = vec![];
        for item in self.tree.scan_prefix(user_id.to_be_bytes()) {
            let (key, raw) = item.map_err(StoreError::from)?;
            if key.len() != 16 {
                return Err(StoreError::MalformedKey(HISTORY_TREE).into());
            }
            let entry: HistoryEntry = minicbor::decode(&raw).map_err(StoreError::from)?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalletError;

    fn temporary_db() -> Db {
        sled::Config::new()
            .temporary(true)
            .open()
            .expect("failed to open temporary sled db")
    }

    #[test]
    fn balance_round_trips_through_tree() {
        let db = temporary_db();
        let table = SledBalanceTable::open(&db).unwrap();

        assert_eq!(table.select_by_id(9).unwrap().amount(), 0);

        let written = table.insert_or_update(9, 4_700).unwrap();
        let read = table.select_by_id(9).unwrap();

        assert_eq!(read.amount(), 4_700);
        assert_eq!(read, written);
    }

    #[test]
    fn corrupted_stored_balance_surfaces_as_invalid_point() {
        let db = temporary_db();
        let table = SledBalanceTable::open(&db).unwrap();
        let record = BalanceRecord {
            amount: -1,
            updated_at: TimeStamp::now(),
        };
        table
            .tree
            .insert(5i64.to_be_bytes(), minicbor::to_vec(&record).unwrap())
            .unwrap();

        assert!(matches!(
            table.select_by_id(5),
            Err(WalletError::InvalidPoint)
        ));
    }

    #[test]
    fn history_prefix_scan_is_per_user_and_ordered() {
        let db = temporary_db();
        let table = SledHistoryTable::open(&db).unwrap();
        table
            .insert(1, 1_000, TransactionKind::Charge, TimeStamp::now())
            .unwrap();
        table
            .insert(2, 50, TransactionKind::Charge, TimeStamp::now())
            .unwrap();
        table
            .insert(1, 700, TransactionKind::Use, TimeStamp::now())
            .unwrap();

        let entries = table.select_all_by_user_id(1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, 1_000);
        assert_eq!(entries[1].amount, 700);
        assert_eq!(entries[1].kind, TransactionKind::Use);
        assert!(entries[0].id < entries[1].id);
    }
}
