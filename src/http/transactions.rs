//! Ledger transfers and transaction history.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::http::dto::{required, LedgerEntryView, LedgerTransferRequest, TransferView};
use crate::http::error::ApiError;
use crate::http::extract::ApiJson;
use crate::http::middleware::AuthUser;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::StoreError;

/// Move funds between two registered wallets. The caller must own the sender.
pub async fn record_transfer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<LedgerTransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sender = required(body.sender_address, "senderAddress")?;
    let recipient = required(body.recipient_address, "recipientAddress")?;
    let lamports = required(body.amount, "amount")?.to_lamports()?;

    let sender_wallet = state
        .wallets
        .get(&sender)
        .ok_or_else(|| StoreError::WalletNotFound(sender.clone()))?;
    if state.wallets.get(&recipient).is_none() {
        return Err(StoreError::WalletNotFound(recipient).into());
    }
    if sender_wallet.owner != Some(user.id) {
        metrics::record_transfer("ledger", "forbidden");
        return Err(ApiError::Forbidden(
            "You are not the owner of the sender wallet".into(),
        ));
    }

    let record = match state
        .wallets
        .record_transfer(&sender, &recipient, lamports, body.signature)
    {
        Ok(record) => record,
        Err(e) => {
            metrics::record_transfer("ledger", "rejected");
            return Err(e.into());
        }
    };

    metrics::record_transfer("ledger", "ok");
    tracing::info!(
        username = %user.username,
        from = %sender,
        to = %recipient,
        lamports,
        "Ledger transfer recorded"
    );

    Ok(Json(json!({
        "message": "Transaction completed successfully",
        "transaction": TransferView::from(record),
    })))
}

pub async fn wallet_history(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions: Vec<LedgerEntryView> = state
        .wallets
        .history(&address)?
        .into_iter()
        .map(LedgerEntryView::from)
        .collect();
    Ok(Json(json!({ "transactions": transactions })))
}

/// Transfers touching any of the caller's wallets, newest first.
pub async fn list_transfers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    let addresses: Vec<String> = state
        .wallets
        .wallets_for(user.id)
        .into_iter()
        .map(|w| w.address)
        .collect();

    let transactions: Vec<TransferView> = state
        .wallets
        .transfers_involving(&addresses)
        .into_iter()
        .map(TransferView::from)
        .collect();
    Json(json!({ "transactions": transactions }))
}

/// Remove a transfer from the flat list. Only a party to it may do so;
/// anyone else gets the same 404 as for an unknown id.
pub async fn delete_transfer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let not_found = || ApiError::NotFound("Transaction not found".into());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let record = state.wallets.get_transfer(id).ok_or_else(not_found)?;
    let owns = |address: &str| {
        state
            .wallets
            .get(address)
            .is_some_and(|w| w.owner == Some(user.id))
    };
    if !owns(&record.sender_address) && !owns(&record.recipient_address) {
        return Err(not_found());
    }

    if !state.wallets.delete_transfer(id) {
        return Err(not_found());
    }
    tracing::info!(username = %user.username, transfer_id = %id, "Transfer deleted");
    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
