//! Request bodies and response views.
//!
//! Field names are camelCase on the wire. Amounts arrive in SOL, as a number
//! or a numeric string, and go back out in both SOL and lamports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blockchain::{lamports_to_sol, sol_to_lamports};
use crate::http::error::ApiError;
use crate::store::{LedgerEntry, TransferRecord, WalletRecord};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Profile changes. A `userId` sent by older clients is ignored; the account
/// always comes from the session token.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    pub wallet_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWalletRequest {
    pub public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub wallet_address: Option<String>,
    pub amount: Option<Amount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransferRequest {
    pub sender_address: Option<String>,
    pub recipient_address: Option<String>,
    pub amount: Option<Amount>,
    pub signature: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransferRequest {
    pub sender_private_key: Option<serde_json::Value>,
    pub recipient_address: Option<String>,
    pub amount: Option<Amount>,
}

/// A SOL amount as sent by clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Convert to lamports. Zero, negative and non-numeric amounts are refused.
    pub fn to_lamports(&self) -> Result<u64, ApiError> {
        let sol = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid amount: {}", s)))?,
        };
        let lamports = sol_to_lamports(sol)?;
        if lamports == 0 {
            return Err(ApiError::BadRequest("Amount must be greater than zero".into()));
        }
        Ok(lamports)
    }
}

/// Unwrap a required body field or fail with a 400 naming it.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    pub address: String,
    pub balance: f64,
    pub balance_lamports: u64,
    pub transaction_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<WalletRecord> for WalletView {
    fn from(wallet: WalletRecord) -> Self {
        Self {
            balance: lamports_to_sol(wallet.balance_lamports),
            balance_lamports: wallet.balance_lamports,
            transaction_count: wallet.transactions.len(),
            address: wallet.address,
            created_at: wallet.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryView {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub amount: f64,
}

impl From<LedgerEntry> for LedgerEntryView {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            amount: lamports_to_sol(entry.amount_lamports),
            entry,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferView {
    #[serde(flatten)]
    pub record: TransferRecord,
    pub amount: f64,
}

impl From<TransferRecord> for TransferView {
    fn from(record: TransferRecord) -> Self {
        Self {
            amount: lamports_to_sol(record.amount_lamports),
            record,
        }
    }
}

/// Result of an on-chain transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransferView {
    pub message: &'static str,
    pub signature: String,
    pub amount: f64,
    pub lamports: u64,
    /// Ledger record, when both wallets are registered.
    pub transfer_id: Option<Uuid>,
}
