//! Persisted records: users and wallet ledgers.
//!
//! # Data Flow
//! ```text
//! startup:  data_dir/users.json, data_dir/wallets.json → load_from_file
//! runtime:  in-memory maps serve all reads and writes
//! flush:    periodic task + shutdown → save_to_file (write temp, rename)
//! ```
//!
//! Without a data directory both stores are purely in-memory.

pub mod persistence;
pub mod users;
pub mod wallets;

use thiserror::Error;

pub use users::{User, UserStore};
pub use wallets::{
    LedgerEntry, TransactionKind, TransactionStatus, TransferRecord, WalletRecord, WalletStore,
};

/// File name of the user snapshot inside the data directory.
pub const USERS_FILE: &str = "users.json";
/// File name of the wallet snapshot inside the data directory.
pub const WALLETS_FILE: &str = "wallets.json";

/// Errors raised by the record stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already exists")]
    UsernameTaken(String),

    #[error("Wallet {0} is registered to another user")]
    WalletOwned(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Wallet {0} not found")]
    WalletNotFound(String),

    #[error("Insufficient balance in {address}: has {balance} lamports, needs {requested}")]
    InsufficientBalance {
        address: String,
        balance: u64,
        requested: u64,
    },

    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
