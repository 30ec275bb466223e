//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ttl > 0, bcrypt cost in range)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{ServerConfig, PLACEHOLDER_JWT_SECRET};

/// bcrypt accepts work factors in this range.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::new("auth.jwt_secret", "must not be empty"));
    } else if config.auth.strict && config.auth.jwt_secret == PLACEHOLDER_JWT_SECRET {
        errors.push(ValidationError::new(
            "auth.jwt_secret",
            "placeholder secret is not allowed in strict mode",
        ));
    }
    if config.auth.token_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.token_ttl_secs", "must be > 0"));
    }
    if !BCRYPT_COST_RANGE.contains(&config.auth.bcrypt_cost) {
        errors.push(ValidationError::new(
            "auth.bcrypt_cost",
            format!(
                "must be between {} and {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            ),
        ));
    }

    for (field, raw) in std::iter::once(("blockchain.rpc_url", &config.blockchain.rpc_url))
        .chain(
            config
                .blockchain
                .failover_urls
                .iter()
                .map(|u| ("blockchain.failover_urls", u)),
        )
    {
        if url::Url::parse(raw).is_err() {
            errors.push(ValidationError::new(field, format!("'{}' is not a URL", raw)));
        }
    }
    if !matches!(
        config.blockchain.commitment.as_str(),
        "processed" | "confirmed" | "finalized"
    ) {
        errors.push(ValidationError::new(
            "blockchain.commitment",
            "must be processed, confirmed or finalized",
        ));
    }
    if config.blockchain.poll_base_delay_ms > config.blockchain.poll_max_delay_ms {
        errors.push(ValidationError::new(
            "blockchain.poll_base_delay_ms",
            "must not exceed poll_max_delay_ms",
        ));
    }

    if config.rate_limit.enabled && config.rate_limit.requests_per_second == 0 {
        errors.push(ValidationError::new("rate_limit.requests_per_second", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
