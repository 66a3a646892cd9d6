//! Service layer API for wallet operations
use crate::error::{Result, WalletError};
use crate::lock::UserLockRegistry;
use crate::point::{Balance, HistoryEntry, TimeStamp, TransactionKind, UserId};
use crate::store::{BalanceStore, HistoryStore};
use crate::validator::{check_amount, check_user_id};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct WalletService<B, H> {
    balances: Arc<B>,
    histories: Arc<H>,
    locks: UserLockRegistry,
}

impl<B: BalanceStore, H: HistoryStore> WalletService<B, H> {
    pub fn new(balances: Arc<B>, histories: Arc<H>) -> Self {
        Self {
            balances,
            histories,
            locks: UserLockRegistry::new(),
        }
    }

    /// Current balance, zero for a user never seen before. Does not take the
    /// user's lock, so a concurrent mutation is either fully visible or not.
    pub fn balance(&self, user_id: UserId) -> Result<Balance> {
        check_user_id(user_id)?;
        self.balances.select_by_id(user_id)
    }

    /// Every charge and use for the user, oldest first.
    pub fn history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>> {
        check_user_id(user_id)?;
        let entries = self.histories.select_all_by_user_id(user_id)?;
        if let Some(bad) = entries.iter().find(|entry| entry.amount < 0) {
            error!(user_id, entry_id = bad.id, amount = bad.amount, "negative balance in history");
            return Err(WalletError::InvalidPoint);
        }
        Ok(entries)
    }

    /// Add `amount` points to the user's balance.
    #[tracing::instrument(skip(self))]
    pub fn charge(&self, user_id: UserId, amount: i64) -> Result<Balance> {
        check_user_id(user_id)?;
        check_amount(amount)?;
        self.mutate(user_id, TransactionKind::Charge, |current| current.charge(amount))
    }

    /// Spend `amount` points from the user's balance.
    #[tracing::instrument(skip(self))]
    pub fn use_points(&self, user_id: UserId, amount: i64) -> Result<Balance> {
        check_user_id(user_id)?;
        check_amount(amount)?;
        self.mutate(user_id, TransactionKind::Use, |current| {
            current.use_points(amount)
        })
    }

    /// Read, apply, write back and record, all under the user's lock.
    fn mutate<F>(&self, user_id: UserId, kind: TransactionKind, apply: F) -> Result<Balance>
    where
        F: FnOnce(&Balance) -> Result<Balance>,
    {
        let lock = self.locks.acquire(user_id);
        let _guard = lock.lock();

        let current = self.balances.select_by_id(user_id)?;
        let next = apply(&current).inspect_err(|err| {
            warn!(user_id, balance = current.amount(), %err, "mutation rejected");
        })?;
        let stored = self.balances.insert_or_update(user_id, next.amount())?;
        if let Err(err) = self
            .histories
            .insert(user_id, stored.amount(), kind, TimeStamp::now())
        {
            // no ledger line, so the balance change must not stand either
            if let Err(restore_err) = self.balances.restore(&current) {
                error!(user_id, %restore_err, "failed to roll back balance");
            }
            warn!(user_id, %err, "history append failed, balance rolled back");
            return Err(err);
        }

        debug!(user_id, ?kind, balance = stored.amount(), "balance updated");
        Ok(stored)
    }

    /// Number of users that have had a lock created so far.
    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }
}
