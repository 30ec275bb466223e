//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → gateway.rs (ChainGateway trait, swappable in tests)
//!     → client.rs (Solana RPC with failover and timeouts)
//!     → transaction.rs (build, sign, submit, confirm)
//!
//! wallet.rs: keypair generation, secret/address decoding
//! types.rs:  errors, lamport/SOL conversion
//! ```
//!
//! # Security Constraints
//! - Secret keys arrive per request and are dropped after signing
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod gateway;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::SolanaGateway;
pub use gateway::ChainGateway;
pub use types::{lamports_to_sol, sol_to_lamports, BlockchainError, BlockchainResult};
