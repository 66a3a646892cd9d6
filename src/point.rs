//! Point balance value object and history records
use crate::config::{MAX_POINT, MIN_USE_POINT};
use crate::error::{Result, WalletError};
use chrono::{DateTime, TimeZone, Utc};

pub type UserId = i64;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    /// Current time at millisecond precision, the precision tables store.
    pub fn now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis())
    }
    /// Out of range millis clamp to the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }
    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> std::result::Result<(), minicbor::encode::Error<W::Error>> {
        e.i64(self.millis())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _: &mut C,
    ) -> std::result::Result<Self, minicbor::decode::Error> {
        let millis = d.i64()?;

        DateTime::from_timestamp_millis(millis)
            .map(TimeStamp)
            .ok_or(minicbor::decode::Error::message(
                "failed to convert millis to utc timestamp",
            ))
    }
}

/// A user's point balance at one instant.
///
/// Instances are immutable. A negative amount can never be constructed, so
/// holding a `Balance` is proof the amount is valid. `charge` and
/// `use_points` return a fresh instance and leave the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    user_id: UserId,
    amount: i64,
    updated_at: TimeStamp<Utc>,
}

impl Balance {
    pub fn create(user_id: UserId, amount: i64, updated_at: TimeStamp<Utc>) -> Result<Self> {
        if amount < 0 {
            return Err(WalletError::InvalidPoint);
        }
        Ok(Self {
            user_id,
            amount,
            updated_at,
        })
    }

    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            amount: 0,
            updated_at: TimeStamp::now(),
        }
    }

    /// Adds `delta` to the balance. The caller guarantees `delta > 0`.
    pub fn charge(&self, delta: i64) -> Result<Self> {
        let would_be = self.amount.saturating_add(delta);
        if would_be > MAX_POINT {
            return Err(WalletError::ChargeCeilingExceeded { would_be });
        }
        Self::create(self.user_id, would_be, TimeStamp::now())
    }

    pub fn use_points(&self, delta: i64) -> Result<Self> {
        if delta < MIN_USE_POINT {
            return Err(WalletError::BelowMinimumSpend);
        }
        let remaining = self.amount - delta;
        if remaining < 0 {
            return Err(WalletError::InsufficientBalance {
                current: self.amount,
            });
        }
        Self::create(self.user_id, remaining, TimeStamp::now())
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
    pub fn amount(&self) -> i64 {
        self.amount
    }
    pub fn updated_at(&self) -> &TimeStamp<Utc> {
        &self.updated_at
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, minicbor::Encode, minicbor::Decode)]
pub enum TransactionKind {
    #[n(0)]
    Charge,
    #[n(1)]
    Use,
}

/// One ledger line. `amount` is the balance after the operation, not the delta.
#[derive(Debug, PartialEq, Eq, Clone, minicbor::Encode, minicbor::Decode)]
pub struct HistoryEntry {
    #[n(0)]
    pub id: u64,
    #[n(1)]
    pub user_id: UserId,
    #[n(2)]
    pub amount: i64,
    #[n(3)]
    pub kind: TransactionKind,
    #[n(4)]
    pub timestamp: TimeStamp<Utc>,
}

impl HistoryEntry {
    pub fn new(
        id: u64,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
        timestamp: TimeStamp<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            amount,
            kind,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_fails_on_construction() {
        let res = Balance::create(1, -1, TimeStamp::now());
        assert!(matches!(res, Err(WalletError::InvalidPoint)));
    }

    #[test]
    fn charge_up_to_ceiling_is_allowed() {
        let balance = Balance::create(1, 90_000, TimeStamp::now()).unwrap();
        let charged = balance.charge(10_000).unwrap();

        assert_eq!(charged.amount(), MAX_POINT);
        assert_eq!(charged.user_id(), 1);
        // receiver is untouched
        assert_eq!(balance.amount(), 90_000);
    }

    #[test]
    fn charge_past_ceiling_reports_would_be_amount() {
        let balance = Balance::create(1, 90_000, TimeStamp::now()).unwrap();
        match balance.charge(10_001) {
            Err(WalletError::ChargeCeilingExceeded { would_be }) => assert_eq!(would_be, 100_001),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn charge_saturates_instead_of_overflowing() {
        let balance = Balance::create(1, 1, TimeStamp::now()).unwrap();
        match balance.charge(i64::MAX) {
            Err(WalletError::ChargeCeilingExceeded { would_be }) => assert_eq!(would_be, i64::MAX),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn minimum_spend_is_checked_before_balance() {
        let balance = Balance::empty(1);
        assert!(matches!(
            balance.use_points(99),
            Err(WalletError::BelowMinimumSpend)
        ));
    }

    #[test]
    fn overspend_reports_current_amount() {
        let balance = Balance::create(1, 500, TimeStamp::now()).unwrap();
        match balance.use_points(501) {
            Err(WalletError::InsufficientBalance { current }) => assert_eq!(current, 500),
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(balance.use_points(500).unwrap().amount(), 0);
    }

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::from_millis(1_700_000_000_123);

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
        assert_eq!(decode.millis(), 1_700_000_000_123);
    }

    #[test]
    fn now_survives_encoding_unchanged() {
        let now = TimeStamp::now();

        let encoding = minicbor::to_vec(now.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(now, decode);
    }
}
