pub mod auth;
pub mod metrics;
pub mod timeout;

pub use auth::{bearer_token, require_auth, AuthUser};
pub use metrics::track_metrics;
pub use timeout::request_timeout;
