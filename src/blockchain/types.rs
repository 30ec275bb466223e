//! Chain-specific types, unit conversion and error definitions.

use solana_sdk::native_token::LAMPORTS_PER_SOL;
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within expected time.
    #[error("Transaction {signature} not confirmed after {secs} seconds")]
    ConfirmationTimeout { signature: String, secs: u64 },

    /// Transaction was executed but failed on-chain.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Secret key could not be decoded into a keypair.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Public address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount is negative, not a number, or too large.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Blockchain client not initialized or disabled.
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

impl BlockchainError {
    /// Whether the error was caused by caller input rather than the network.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BlockchainError::InvalidKey(_)
                | BlockchainError::InvalidAddress(_)
                | BlockchainError::InvalidAmount(_)
        )
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction not yet seen at the configured commitment.
    Pending,
    /// Transaction reached the configured commitment.
    Confirmed,
    /// Transaction executed with an error.
    Failed(String),
}

/// Convert lamports to SOL for display.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a SOL amount to lamports, rounding to the nearest lamport.
pub fn sol_to_lamports(sol: f64) -> BlockchainResult<u64> {
    if !sol.is_finite() {
        return Err(BlockchainError::InvalidAmount(format!("{} is not a number", sol)));
    }
    if sol < 0.0 {
        return Err(BlockchainError::InvalidAmount(format!("{} is negative", sol)));
    }

    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports > u64::MAX as f64 {
        return Err(BlockchainError::InvalidAmount(format!("{} SOL overflows", sol)));
    }
    Ok(lamports as u64)
}
