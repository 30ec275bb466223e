//! Keypair generation and decoding.
//!
//! # Security
//! - Secret keys are never logged or serialized by the server
//! - Only the derived public address appears in logs

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::str::FromStr;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Length of an ed25519 keypair secret (seed + public key).
pub const SECRET_KEY_LEN: usize = 64;

/// Generate a fresh random keypair.
pub fn generate_keypair() -> Keypair {
    let keypair = Keypair::new();
    tracing::debug!(address = %keypair.pubkey(), "Generated keypair");
    keypair
}

/// Hex encoding of the 64-byte secret, as shown to users after generation.
pub fn secret_to_hex(keypair: &Keypair) -> String {
    hex::encode(keypair.to_bytes())
}

/// Decode a 64-byte secret key.
///
/// Accepted encodings:
/// - JSON byte array, e.g. `[12,34,...]`
/// - hex (128 characters, optional `0x` prefix)
/// - base58
pub fn parse_secret_key(input: &str) -> BlockchainResult<Keypair> {
    let trimmed = input.trim();

    let bytes = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(trimmed)
            .map_err(|e| BlockchainError::InvalidKey(format!("Invalid byte array: {}", e)))?
    } else {
        let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if hex_str.len() == SECRET_KEY_LEN * 2 && hex_str.chars().all(|c| c.is_ascii_hexdigit()) {
            hex::decode(hex_str)
                .map_err(|e| BlockchainError::InvalidKey(format!("Invalid hex: {}", e)))?
        } else {
            bs58::decode(trimmed)
                .into_vec()
                .map_err(|e| BlockchainError::InvalidKey(format!("Invalid base58: {}", e)))?
        }
    };

    if bytes.len() != SECRET_KEY_LEN {
        return Err(BlockchainError::InvalidKey(format!(
            "expected {} bytes, got {}",
            SECRET_KEY_LEN,
            bytes.len()
        )));
    }

    Keypair::try_from(bytes.as_slice())
        .map_err(|e| BlockchainError::InvalidKey(format!("Invalid keypair bytes: {}", e)))
}

/// Parse a base58 public address.
pub fn parse_address(input: &str) -> BlockchainResult<Pubkey> {
    Pubkey::from_str(input.trim())
        .map_err(|_| BlockchainError::InvalidAddress(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_preserves_address() {
        let keypair = generate_keypair();
        let restored = parse_secret_key(&secret_to_hex(&keypair)).unwrap();
        assert_eq!(restored.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_parse_json_array_secret() {
        let keypair = generate_keypair();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        let restored = parse_secret_key(&json).unwrap();
        assert_eq!(restored.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_parse_base58_secret() {
        let keypair = generate_keypair();
        let restored = parse_secret_key(&keypair.to_base58_string()).unwrap();
        assert_eq!(restored.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_rejects_short_secret() {
        let err = parse_secret_key("[1,2,3]").unwrap_err();
        assert!(err.to_string().contains("expected 64 bytes"));
        assert!(parse_secret_key("not a key at all!").is_err());
    }

    #[test]
    fn test_parse_address() {
        let keypair = generate_keypair();
        let address = keypair.pubkey().to_string();
        assert_eq!(parse_address(&address).unwrap(), keypair.pubkey());
        assert!(parse_address("0xdeadbeef").is_err());
    }
}
