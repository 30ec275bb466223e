//! Resilience helpers.
//!
//! RPC failover and per-call timeouts live in the blockchain client; this
//! module holds the shared pacing logic for polling loops.

pub mod backoff;
