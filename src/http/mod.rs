//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id, trace span, timeout, body limit, CORS)
//!     → security::rate_limit (signup/login only)
//!     → middleware::auth (bearer token → AuthUser) on protected routes
//!     → auth.rs / wallet.rs / transactions.rs handlers
//!     → error.rs (ApiError → status + {"error": ...})
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod server;
pub mod transactions;
pub mod wallet;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
