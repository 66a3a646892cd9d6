//! Request preconditions, checked before any lock or table is touched
use crate::error::{Result, WalletError};
use crate::point::UserId;

pub fn check_user_id(user_id: UserId) -> Result<()> {
    if user_id <= 0 {
        return Err(WalletError::InvalidIdentifier);
    }
    Ok(())
}

pub fn check_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(WalletError::InvalidAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_ids() {
        for id in [0, -1, -100, i64::MIN] {
            assert!(matches!(
                check_user_id(id),
                Err(WalletError::InvalidIdentifier)
            ));
        }
        assert!(check_user_id(1).is_ok());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [0, -1, -100] {
            assert!(matches!(check_amount(amount), Err(WalletError::InvalidAmount)));
        }
        assert!(check_amount(1).is_ok());
    }
}
