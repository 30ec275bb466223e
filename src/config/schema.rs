//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Placeholder secret shipped in the defaults. Rejected by strict validation.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root configuration for the wallet server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Session token and password hashing settings.
    pub auth: AuthConfig,

    /// Blockchain RPC settings.
    pub blockchain: BlockchainConfig,

    /// Where user and wallet records are persisted.
    pub storage: StorageConfig,

    /// Rate limiting for the credential endpoints.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 60,
            max_body_size: 64 * 1024,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,

    /// Session token lifetime in seconds.
    pub token_ttl_secs: u64,

    /// bcrypt work factor.
    pub bcrypt_cost: u32,

    /// How often expired entries are dropped from the revocation list.
    pub prune_interval_secs: u64,

    /// Refuse to start with the placeholder secret.
    pub strict: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Set JWT_SECRET in production.
            jwt_secret: PLACEHOLDER_JWT_SECRET.to_string(),
            token_ttl_secs: 15 * 60,
            bcrypt_cost: 10,
            prune_interval_secs: 60,
            strict: false,
        }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Commitment level: "processed", "confirmed" or "finalized".
    pub commitment: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Rebroadcast attempts the RPC node makes for a submitted transaction.
    pub max_retries: usize,

    /// Maximum time to wait for a submitted transaction to confirm.
    pub confirmation_timeout_secs: u64,

    /// Base delay between confirmation polls in milliseconds.
    pub poll_base_delay_ms: u64,

    /// Maximum delay between confirmation polls in milliseconds.
    pub poll_max_delay_ms: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            failover_urls: Vec::new(),
            commitment: "confirmed".to_string(),
            rpc_timeout_secs: 30,
            max_retries: 3,
            confirmation_timeout_secs: 60,
            poll_base_delay_ms: 500,
            poll_max_delay_ms: 4000,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `users.json` and `wallets.json`.
    /// When unset, records live in memory only.
    pub data_dir: Option<String>,

    /// Seconds between background snapshots. 0 saves on shutdown only.
    pub flush_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            flush_interval_secs: 30,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per second per IP.
    pub requests_per_second: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 5,
            burst_size: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.auth.token_ttl_secs, 900);
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "s3cret"

            [blockchain]
            rpc_url = "http://127.0.0.1:8899"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_ttl_secs, 900);
        assert_eq!(config.blockchain.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.blockchain.commitment, "confirmed");
    }
}
