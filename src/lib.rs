//! Wallet API server library.
//!
//! Accounts with bcrypt-hashed passwords and short-lived JWT sessions, a
//! wallet ledger with per-wallet transaction logs, and a Solana gateway for
//! live balances and on-chain transfers.

// Core subsystems
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod http;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
