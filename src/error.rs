use crate::config::{MAX_POINT, MIN_USE_POINT};

pub type Result<T> = std::result::Result<T, WalletError>;

#[derive(thiserror::Error, Debug)]
pub enum WalletError {
    #[error("invalid user id")]
    InvalidIdentifier,
    #[error("the requested point amount is invalid")]
    InvalidAmount,
    #[error("the user holds an invalid point balance")]
    InvalidPoint,
    #[error(
        "points can be held up to {}, balance after charge would be {would_be}",
        MAX_POINT
    )]
    ChargeCeilingExceeded { would_be: i64 },
    #[error("use request exceeds held points, current balance {current}")]
    InsufficientBalance { current: i64 },
    #[error("at least {} points must be used", MIN_USE_POINT)]
    BelowMinimumSpend,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sled backend failure: {0}")]
    Sled(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("failed to decode record: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("malformed key in tree {0}")]
    MalformedKey(&'static str),
}

impl WalletError {
    /// Transport status class for this error.
    pub fn status(&self) -> u16 {
        match self {
            WalletError::InvalidPoint | WalletError::Storage(_) => 500,
            _ => 400,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WalletError::InvalidIdentifier => "INVALID_ID",
            WalletError::InvalidAmount => "INVALID_AMOUNT",
            WalletError::InvalidPoint => "INVALID_POINT",
            WalletError::ChargeCeilingExceeded { .. } => "EXCEEDED_CHARGE_POINT",
            WalletError::InsufficientBalance { .. } => "OVER_USED_POINT",
            WalletError::BelowMinimumSpend => "INVALID_USE_AMOUNT",
            WalletError::Storage(_) => "STORAGE_FAILURE",
        }
    }
}

/// What a transport layer hands back to its client for a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
}

impl From<&WalletError> for ErrorResponse {
    fn from(err: &WalletError) -> Self {
        Self {
            status: err.status(),
            code: err.code(),
            message: err.to_string(),
        }
    }
}
