//! Wallet registration, balances and on-chain transfers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use std::sync::Arc;
use uuid::Uuid;

use crate::blockchain::wallet::{parse_address, parse_secret_key};
use crate::blockchain::{lamports_to_sol, BlockchainResult, ChainGateway};
use crate::http::dto::{
    required, AmountRequest, BalanceRequest, ChainTransferRequest, ChainTransferView,
    RegisterWalletRequest, WalletView,
};
use crate::http::error::ApiError;
use crate::http::extract::ApiJson;
use crate::http::middleware::AuthUser;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::{StoreError, WalletStore};

/// Live balance straight from the chain.
pub async fn check_balance(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BalanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let address = required(body.wallet_address, "walletAddress")?;
    let pubkey = parse_address(&address)?;

    let lamports = state.gateway.get_balance(&pubkey).await?;
    tracing::debug!(address = %pubkey, lamports, "Balance fetched");

    Ok(Json(json!({
        "walletAddress": pubkey.to_string(),
        "lamports": lamports,
        "balance": lamports_to_sol(lamports),
    })))
}

/// Register a public key under the caller. Re-registering is a no-op.
pub async fn register_wallet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<RegisterWalletRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pubkey = parse_address(&required(body.public_key, "publicKey")?)?;
    let wallet = state.wallets.register(&pubkey.to_string(), user.id)?;

    tracing::info!(username = %user.username, address = %wallet.address, "Wallet registered");
    Ok((StatusCode::CREATED, Json(WalletView::from(wallet))))
}

pub async fn list_wallets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    let wallets: Vec<WalletView> = state
        .wallets
        .wallets_for(user.id)
        .into_iter()
        .map(WalletView::from)
        .collect();
    Json(json!({ "wallets": wallets }))
}

/// Credit one of the caller's ledger wallets.
pub async fn deposit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<AmountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let address = required(body.wallet_address, "walletAddress")?;
    let lamports = required(body.amount, "amount")?.to_lamports()?;

    let wallet = state
        .wallets
        .get(&address)
        .ok_or_else(|| StoreError::WalletNotFound(address.clone()))?;
    if wallet.owner != Some(user.id) {
        return Err(ApiError::Forbidden("You do not own this wallet".into()));
    }

    let wallet = state.wallets.deposit(&address, lamports)?;
    metrics::record_transfer("deposit", "ok");
    tracing::info!(address = %address, lamports, "Deposit recorded");

    Ok(Json(json!({
        "message": "Deposit successful",
        "wallet": WalletView::from(wallet),
    })))
}

/// Sign and submit a transfer with a caller-supplied secret key.
///
/// The key is used for this request only. When both addresses are
/// registered, the transfer is mirrored into the ledger. Submission and
/// mirroring run in their own task, so a client that disconnects or times out
/// cannot leave a confirmed transfer unrecorded.
pub async fn send_on_chain(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChainTransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let secret = match required(body.sender_private_key, "senderPrivateKey")? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    let recipient = parse_address(&required(body.recipient_address, "recipientAddress")?)?;
    let lamports = required(body.amount, "amount")?.to_lamports()?;
    let sender = parse_secret_key(&secret)?;

    let task = tokio::spawn(submit_and_record(
        state.gateway.clone(),
        state.wallets.clone(),
        sender,
        recipient,
        lamports,
    ));
    let (signature, transfer_id) = task
        .await
        .map_err(|e| ApiError::Internal(format!("transfer task failed: {}", e)))??;

    Ok(Json(ChainTransferView {
        message: "Transaction successful",
        signature: signature.to_string(),
        amount: lamports_to_sol(lamports),
        lamports,
        transfer_id,
    }))
}

async fn submit_and_record(
    gateway: Arc<dyn ChainGateway>,
    wallets: WalletStore,
    sender: Keypair,
    recipient: Pubkey,
    lamports: u64,
) -> BlockchainResult<(Signature, Option<Uuid>)> {
    let signature = match gateway.transfer(&sender, &recipient, lamports).await {
        Ok(signature) => signature,
        Err(e) => {
            metrics::record_transfer("chain", "failed");
            tracing::warn!(from = %sender.pubkey(), to = %recipient, error = %e, "On-chain transfer failed");
            return Err(e);
        }
    };
    metrics::record_transfer("chain", "ok");

    let sender_address = sender.pubkey().to_string();
    let recipient_address = recipient.to_string();
    if wallets.get(&sender_address).is_none() || wallets.get(&recipient_address).is_none() {
        return Ok((signature, None));
    }

    match wallets.record_transfer(
        &sender_address,
        &recipient_address,
        lamports,
        Some(signature.to_string()),
    ) {
        Ok(record) => Ok((signature, Some(record.id))),
        Err(e) => {
            tracing::warn!(signature = %signature, error = %e, "Confirmed transfer not mirrored in ledger");
            Ok((signature, None))
        }
    }
}

/// Fund an address from the network faucet.
pub async fn airdrop(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AmountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pubkey = parse_address(&required(body.wallet_address, "walletAddress")?)?;
    let lamports = required(body.amount, "amount")?.to_lamports()?;

    let signature = state
        .gateway
        .request_airdrop(&pubkey, lamports)
        .await?;
    tracing::info!(address = %pubkey, lamports, signature = %signature, "Airdrop confirmed");

    Ok(Json(json!({
        "message": "Airdrop successful",
        "signature": signature.to_string(),
        "lamports": lamports,
    })))
}
