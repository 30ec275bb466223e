//! Transfer building and confirmation monitoring.
//!
//! # Responsibilities
//! - Build and sign native-token transfers
//! - Poll signature status with capped backoff until confirmed or deadline

use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::SolanaGateway;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::resilience::backoff::calculate_backoff;

/// Build a signed system-program transfer paid for by `sender`.
#[allow(deprecated)]
pub fn build_transfer(
    sender: &Keypair,
    recipient: &Pubkey,
    lamports: u64,
    recent_blockhash: Hash,
) -> Transaction {
    let instruction =
        solana_sdk::system_instruction::transfer(&sender.pubkey(), recipient, lamports);
    Transaction::new_signed_with_payer(
        &[instruction],
        Some(&sender.pubkey()),
        &[sender],
        recent_blockhash,
    )
}

/// Wait for a transaction to reach the gateway's commitment level.
pub async fn wait_for_confirmation(
    gateway: &SolanaGateway,
    signature: &Signature,
) -> BlockchainResult<()> {
    let config = gateway.config();
    let deadline = Duration::from_secs(config.confirmation_timeout_secs);

    let result = timeout(deadline, async {
        let mut attempt = 0u32;
        loop {
            match gateway.get_signature_status(signature).await {
                Ok(ConfirmationStatus::Confirmed) => return Ok(()),
                Ok(ConfirmationStatus::Failed(reason)) => {
                    return Err(BlockchainError::TransactionFailed(reason));
                }
                Ok(ConfirmationStatus::Pending) => {
                    tracing::debug!(signature = %signature, attempt, "Transaction pending");
                }
                Err(e) => {
                    tracing::warn!(signature = %signature, error = %e, "Status poll failed");
                }
            }

            attempt += 1;
            sleep(calculate_backoff(
                attempt,
                config.poll_base_delay_ms,
                config.poll_max_delay_ms,
            ))
            .await;
        }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => Err(BlockchainError::ConfirmationTimeout {
            signature: signature.to_string(),
            secs: config.confirmation_timeout_secs,
        }),
    }
}
