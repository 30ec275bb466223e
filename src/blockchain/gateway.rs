//! The seam between the HTTP layer and the chain.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};

use crate::blockchain::types::BlockchainResult;

/// Operations the server needs from a blockchain network.
///
/// `SolanaGateway` talks to a real RPC node; tests substitute an in-memory
/// implementation.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Balance of an address in lamports.
    async fn get_balance(&self, address: &Pubkey) -> BlockchainResult<u64>;

    /// Transfer lamports from the signer to `recipient` and wait for
    /// confirmation. Returns the transaction signature.
    async fn transfer(
        &self,
        sender: &Keypair,
        recipient: &Pubkey,
        lamports: u64,
    ) -> BlockchainResult<Signature>;

    /// Ask the network faucet for lamports (devnet/testnet only).
    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> BlockchainResult<Signature>;

    /// Whether the network is reachable.
    async fn is_healthy(&self) -> bool;
}
