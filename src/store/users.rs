//! User records keyed by username.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::store::persistence::{read_snapshot, write_snapshot};
use crate::store::{StoreError, StoreResult};

/// A registered account. Only the bcrypt hash of the password is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A thread-safe user store.
#[derive(Clone, Default)]
pub struct UserStore {
    inner: Arc<DashMap<String, User>>,
    rename_lock: Arc<Mutex<()>>,
    persistence_path: Option<PathBuf>,
}

impl UserStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            rename_lock: Arc::new(Mutex::new(())),
            persistence_path,
        }
    }

    /// Load from file if it exists; later saves go to the same path.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let store = Self::new(Some(path.to_path_buf()));
        if let Some(map) = read_snapshot::<HashMap<String, User>>(path)? {
            for (k, v) in map {
                store.inner.insert(k, v);
            }
            tracing::info!(count = store.inner.len(), "Loaded users from file");
        }
        Ok(store)
    }

    /// Save to file. No-op for in-memory stores.
    pub fn save_to_file(&self) -> StoreResult<()> {
        if let Some(path) = &self.persistence_path {
            let map: HashMap<_, _> = self
                .inner
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect();
            write_snapshot(path, &map)?;
            tracing::debug!(count = map.len(), "Saved users to file");
        }
        Ok(())
    }

    /// Insert a new user. Usernames are unique and case-sensitive.
    pub fn insert(&self, username: &str, password_hash: String) -> StoreResult<User> {
        match self.inner.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::UsernameTaken(username.to_string())),
            Entry::Vacant(slot) => {
                let user = User {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    password_hash,
                    created_at: Utc::now(),
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    /// Move the account stored under `old` to the key `new`.
    ///
    /// Renames are serialized so two of them cannot both read the same old
    /// record. The new key is claimed before the old one is released.
    pub fn rename(&self, old: &str, new: &str) -> StoreResult<User> {
        let _guard = self
            .rename_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut user = self
            .find_by_username(old)
            .ok_or_else(|| StoreError::UserNotFound(old.to_string()))?;
        user.username = new.to_string();

        match self.inner.entry(new.to_string()) {
            Entry::Occupied(_) => return Err(StoreError::UsernameTaken(new.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
            }
        }
        self.inner.remove(old);
        Ok(user)
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.inner.get(username).map(|r| r.value().clone())
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.inner
            .iter()
            .find(|r| r.value().id == id)
            .map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
