//! Wallet balances and their append-only transaction logs.
//!
//! A transfer touches two wallets and the flat transfer list, so the whole
//! ledger sits behind one lock rather than in a sharded map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::store::persistence::{read_snapshot, write_snapshot};
use crate::store::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Receive,
    Deposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// One line of a wallet's transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount_lamports: u64,
    pub signature: Option<String>,
    pub counterparty_address: Option<String>,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

/// A wallet known to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub address: String,
    pub owner: Option<Uuid>,
    pub balance_lamports: u64,
    pub transactions: Vec<LedgerEntry>,
    pub created_at: DateTime<Utc>,
}

/// Flat view of a transfer between two wallets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub id: Uuid,
    pub sender_address: String,
    pub recipient_address: String,
    pub amount_lamports: u64,
    pub signature: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Ledger {
    wallets: HashMap<String, WalletRecord>,
    transfers: Vec<TransferRecord>,
}

/// Thread-safe wallet ledger.
#[derive(Clone, Default)]
pub struct WalletStore {
    inner: Arc<RwLock<Ledger>>,
    persistence_path: Option<PathBuf>,
}

impl WalletStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Ledger::default())),
            persistence_path,
        }
    }

    /// Load from file if it exists; later saves go to the same path.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let store = Self::new(Some(path.to_path_buf()));
        if let Some(ledger) = read_snapshot::<Ledger>(path)? {
            tracing::info!(
                wallets = ledger.wallets.len(),
                transfers = ledger.transfers.len(),
                "Loaded wallet ledger from file"
            );
            *store.write() = ledger;
        }
        Ok(store)
    }

    /// Save to file. No-op for in-memory stores.
    pub fn save_to_file(&self) -> StoreResult<()> {
        if let Some(path) = &self.persistence_path {
            // Snapshot under the lock, write without it.
            let ledger = self.read().clone();
            write_snapshot(path, &ledger)?;
            tracing::debug!(wallets = ledger.wallets.len(), "Saved wallet ledger to file");
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Ledger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Ledger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or import) a wallet for `owner`.
    ///
    /// Registering the same address again for the same owner returns the
    /// existing record. An address claimed by someone else is refused; an
    /// unowned address is claimed.
    pub fn register(&self, address: &str, owner: Uuid) -> StoreResult<WalletRecord> {
        let mut ledger = self.write();
        match ledger.wallets.get_mut(address) {
            Some(wallet) => match wallet.owner {
                Some(existing) if existing != owner => {
                    Err(StoreError::WalletOwned(address.to_string()))
                }
                _ => {
                    wallet.owner = Some(owner);
                    Ok(wallet.clone())
                }
            },
            None => {
                let wallet = WalletRecord {
                    address: address.to_string(),
                    owner: Some(owner),
                    balance_lamports: 0,
                    transactions: Vec::new(),
                    created_at: Utc::now(),
                };
                ledger.wallets.insert(address.to_string(), wallet.clone());
                Ok(wallet)
            }
        }
    }

    pub fn get(&self, address: &str) -> Option<WalletRecord> {
        self.read().wallets.get(address).cloned()
    }

    /// All wallets owned by `owner`, oldest first.
    pub fn wallets_for(&self, owner: Uuid) -> Vec<WalletRecord> {
        let mut wallets: Vec<_> = self
            .read()
            .wallets
            .values()
            .filter(|w| w.owner == Some(owner))
            .cloned()
            .collect();
        wallets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        wallets
    }

    /// Credit a wallet and log a deposit.
    pub fn deposit(&self, address: &str, lamports: u64) -> StoreResult<WalletRecord> {
        if lamports == 0 {
            return Err(StoreError::InvalidTransfer("amount must be positive".into()));
        }

        let mut ledger = self.write();
        let wallet = ledger
            .wallets
            .get_mut(address)
            .ok_or_else(|| StoreError::WalletNotFound(address.to_string()))?;

        wallet.balance_lamports = wallet.balance_lamports.checked_add(lamports).ok_or_else(|| {
            StoreError::InvalidTransfer("balance would overflow".into())
        })?;
        wallet.transactions.push(LedgerEntry {
            id: Uuid::new_v4(),
            kind: TransactionKind::Deposit,
            amount_lamports: lamports,
            signature: None,
            counterparty_address: None,
            status: TransactionStatus::Completed,
            timestamp: Utc::now(),
        });
        Ok(wallet.clone())
    }

    /// Move lamports between two registered wallets, logging a `Send` on the
    /// sender and a `Receive` on the recipient with the same timestamp.
    pub fn record_transfer(
        &self,
        sender: &str,
        recipient: &str,
        lamports: u64,
        signature: Option<String>,
    ) -> StoreResult<TransferRecord> {
        if lamports == 0 {
            return Err(StoreError::InvalidTransfer("amount must be positive".into()));
        }
        if sender == recipient {
            return Err(StoreError::InvalidTransfer(
                "sender and recipient are the same wallet".into(),
            ));
        }

        let mut ledger = self.write();

        let sender_balance = ledger
            .wallets
            .get(sender)
            .map(|w| w.balance_lamports)
            .ok_or_else(|| StoreError::WalletNotFound(sender.to_string()))?;
        let recipient_balance = ledger
            .wallets
            .get(recipient)
            .map(|w| w.balance_lamports)
            .ok_or_else(|| StoreError::WalletNotFound(recipient.to_string()))?;

        if sender_balance < lamports {
            return Err(StoreError::InsufficientBalance {
                address: sender.to_string(),
                balance: sender_balance,
                requested: lamports,
            });
        }
        let new_recipient_balance = recipient_balance.checked_add(lamports).ok_or_else(|| {
            StoreError::InvalidTransfer("recipient balance would overflow".into())
        })?;

        let timestamp = Utc::now();

        // Both lookups above succeeded under the same write guard.
        if let Some(wallet) = ledger.wallets.get_mut(sender) {
            wallet.balance_lamports = sender_balance - lamports;
            wallet.transactions.push(LedgerEntry {
                id: Uuid::new_v4(),
                kind: TransactionKind::Send,
                amount_lamports: lamports,
                signature: signature.clone(),
                counterparty_address: Some(recipient.to_string()),
                status: TransactionStatus::Completed,
                timestamp,
            });
        }
        if let Some(wallet) = ledger.wallets.get_mut(recipient) {
            wallet.balance_lamports = new_recipient_balance;
            wallet.transactions.push(LedgerEntry {
                id: Uuid::new_v4(),
                kind: TransactionKind::Receive,
                amount_lamports: lamports,
                signature: signature.clone(),
                counterparty_address: Some(sender.to_string()),
                status: TransactionStatus::Completed,
                timestamp,
            });
        }

        let record = TransferRecord {
            id: Uuid::new_v4(),
            sender_address: sender.to_string(),
            recipient_address: recipient.to_string(),
            amount_lamports: lamports,
            signature,
            timestamp,
        };
        ledger.transfers.push(record.clone());
        Ok(record)
    }

    /// A wallet's log, newest first.
    pub fn history(&self, address: &str) -> StoreResult<Vec<LedgerEntry>> {
        let ledger = self.read();
        let wallet = ledger
            .wallets
            .get(address)
            .ok_or_else(|| StoreError::WalletNotFound(address.to_string()))?;
        Ok(newest_first(wallet.transactions.clone(), |e| e.timestamp))
    }

    /// Every recorded transfer, newest first.
    pub fn transfers(&self) -> Vec<TransferRecord> {
        newest_first(self.read().transfers.clone(), |t| t.timestamp)
    }

    /// Transfers in which any of `addresses` took part, newest first.
    pub fn transfers_involving(&self, addresses: &[String]) -> Vec<TransferRecord> {
        let involved: Vec<_> = self
            .read()
            .transfers
            .iter()
            .filter(|t| {
                addresses.contains(&t.sender_address) || addresses.contains(&t.recipient_address)
            })
            .cloned()
            .collect();
        newest_first(involved, |t| t.timestamp)
    }

    pub fn get_transfer(&self, id: Uuid) -> Option<TransferRecord> {
        self.read().transfers.iter().find(|t| t.id == id).cloned()
    }

    /// Remove a flat transfer record. Wallet logs are left untouched.
    pub fn delete_transfer(&self, id: Uuid) -> bool {
        let mut ledger = self.write();
        let before = ledger.transfers.len();
        ledger.transfers.retain(|t| t.id != id);
        ledger.transfers.len() != before
    }

    pub fn wallet_count(&self) -> usize {
        self.read().wallets.len()
    }
}

/// Sort by timestamp descending; among equal timestamps the later insert wins.
fn newest_first<T, F>(mut items: Vec<T>, timestamp: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.reverse();
    items.sort_by(|a, b| timestamp(b).cmp(&timestamp(a)));
    items
}
