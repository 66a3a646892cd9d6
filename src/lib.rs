pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod point;
pub mod service;
pub mod store;
pub mod validator;

pub use error::{ErrorResponse, Result, StoreError, WalletError};
pub use point::{Balance, HistoryEntry, TimeStamp, TransactionKind, UserId};
pub use service::WalletService;
