//! Solana RPC client with failover, timeouts and error mapping.
//!
//! # Responsibilities
//! - Connect to one or more JSON-RPC endpoints
//! - Query chain state (balances, signature status, health)
//! - Submit signed transactions with the configured `max_retries`
//! - Handle timeouts and network errors gracefully

use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::transaction::{build_transfer, wait_for_confirmation};
use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ConfirmationStatus,
};
use crate::observability::metrics;

type RpcFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'c>>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct SolanaGateway {
    /// List of clients (primary + failovers).
    clients: Vec<Arc<RpcClient>>,
    /// Configuration.
    config: BlockchainConfig,
    /// Commitment used for queries and preflight.
    commitment: CommitmentConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl SolanaGateway {
    /// Create a new gateway. No network traffic happens until the first call.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let commitment = parse_commitment(&config.commitment)?;

        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let mut clients = vec![Arc::new(RpcClient::new_with_timeout_and_commitment(
            primary.to_string(),
            timeout_duration,
            commitment,
        ))];

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => clients.push(Arc::new(RpcClient::new_with_timeout_and_commitment(
                    url.to_string(),
                    timeout_duration,
                    commitment,
                ))),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = clients.len() - 1,
            commitment = %config.commitment,
            "Blockchain gateway initialized"
        );

        Ok(Self {
            clients,
            config,
            commitment,
            timeout_duration,
        })
    }

    /// Run `call` against each client in order until one succeeds.
    async fn with_failover<T, F>(&self, op: &'static str, call: F) -> BlockchainResult<T>
    where
        F: for<'c> Fn(&'c RpcClient) -> RpcFuture<'c, T>,
    {
        let mut all_timed_out = true;
        for (i, client) in self.clients.iter().enumerate() {
            match timeout(self.timeout_duration, call(client.as_ref())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    all_timed_out = false;
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider");
                }
            }
        }

        if all_timed_out {
            Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
        } else {
            Err(BlockchainError::Rpc(format!("All RPC providers failed to {}", op)))
        }
    }

    /// Get a recent blockhash for signing.
    pub async fn get_latest_blockhash(&self) -> BlockchainResult<Hash> {
        self.with_failover("get latest blockhash", |c| Box::pin(c.get_latest_blockhash()))
            .await
    }

    /// Submit a signed transaction without waiting for it to land.
    pub async fn send_transaction(&self, tx: &Transaction) -> BlockchainResult<Signature> {
        let send_config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment.commitment),
            max_retries: Some(self.config.max_retries),
            ..RpcSendTransactionConfig::default()
        };

        self.with_failover("send transaction", |c| {
            let tx = tx.clone();
            let send_config = send_config.clone();
            Box::pin(async move { c.send_transaction_with_config(&tx, send_config).await })
        })
        .await
    }

    /// Look up the status of a submitted transaction.
    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> BlockchainResult<ConfirmationStatus> {
        let signature = *signature;
        let status = self
            .with_failover("get signature status", |c| {
                Box::pin(async move { c.get_signature_status(&signature).await })
            })
            .await?;

        Ok(match status {
            None => ConfirmationStatus::Pending,
            Some(Ok(())) => ConfirmationStatus::Confirmed,
            Some(Err(e)) => ConfirmationStatus::Failed(e.to_string()),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

#[async_trait]
impl ChainGateway for SolanaGateway {
    async fn get_balance(&self, address: &Pubkey) -> BlockchainResult<u64> {
        let address = *address;
        self.with_failover("get balance", |c| {
            Box::pin(async move { c.get_balance(&address).await })
        })
        .await
    }

    async fn transfer(
        &self,
        sender: &Keypair,
        recipient: &Pubkey,
        lamports: u64,
    ) -> BlockchainResult<Signature> {
        let blockhash = self.get_latest_blockhash().await?;
        let tx = build_transfer(sender, recipient, lamports, blockhash);
        let signature = self.send_transaction(&tx).await?;

        tracing::info!(
            signature = %signature,
            from = %sender.pubkey(),
            to = %recipient,
            lamports,
            "Transfer submitted"
        );

        wait_for_confirmation(self, &signature).await?;
        Ok(signature)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> BlockchainResult<Signature> {
        let address = *address;
        let signature = self
            .with_failover("request airdrop", |c| {
                Box::pin(async move { c.request_airdrop(&address, lamports).await })
            })
            .await?;

        wait_for_confirmation(self, &signature).await?;
        Ok(signature)
    }

    async fn is_healthy(&self) -> bool {
        let healthy = self
            .with_failover("get health", |c| Box::pin(c.get_health()))
            .await
            .is_ok();
        metrics::record_chain_health(healthy);
        healthy
    }
}

impl std::fmt::Debug for SolanaGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaGateway")
            .field("rpc_url", &self.config.rpc_url)
            .field("providers", &self.clients.len())
            .field("commitment", &self.config.commitment)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

fn parse_commitment(raw: &str) -> BlockchainResult<CommitmentConfig> {
    match raw {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(BlockchainError::NotAvailable(format!(
            "unknown commitment level '{}'",
            other
        ))),
    }
}
