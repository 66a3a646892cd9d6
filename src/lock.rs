//! Per-user mutual exclusion for balance mutations
//!
//! Every user id maps to exactly one [`UserLock`], created on first reference
//! and kept for the lifetime of the registry. Mutations for the same user
//! queue on that lock; mutations for different users never share one.
//!
//! Entries are never evicted. For a bounded id space that is a fixed cost;
//! with an unbounded id space the registry grows by one small entry per
//! distinct user ever mutated.
use crate::point::UserId;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct UserLockRegistry {
    locks: DashMap<UserId, Arc<UserLock>>,
}

impl UserLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `user_id`, creating it if this is the first
    /// reference. Concurrent first references all receive the same lock.
    pub fn acquire(&self, user_id: UserId) -> Arc<UserLock> {
        // the shard guard is dropped at the end of this statement, before
        // anyone blocks on the returned lock
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(UserLock::new()))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// An exclusive lock handed out in request order.
#[derive(Debug, Default)]
pub struct UserLock {
    inner: Mutex<()>,
}

impl UserLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock is held. Released when the guard drops.
    pub fn lock(&self) -> UserLockGuard<'_> {
        UserLockGuard {
            guard: Some(self.inner.lock()),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

/// Scoped ownership of a [`UserLock`].
///
/// Dropping the guard performs a fair unlock: if threads are parked on the
/// lock, ownership passes directly to the one that has waited longest, so a
/// thread that just released cannot barge back in ahead of the queue.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct UserLockGuard<'a> {
    guard: Option<MutexGuard<'a, ()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            MutexGuard::unlock_fair(guard);
        }
    }
}
