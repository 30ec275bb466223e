//! Request admission controls.
//!
//! Only the credential endpoints (`/auth/signup`, `/auth/login`) are rate
//! limited; everything else is bounded by the listener's timeout and body
//! size limit.

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiter};
