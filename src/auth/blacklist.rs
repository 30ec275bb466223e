//! In-memory revocation list for logged-out tokens.
//!
//! Entries only need to outlive the token's own expiry; after that signature
//! verification rejects the token anyway and the entry can be pruned.

use dashmap::DashMap;
use std::sync::Arc;

use crate::observability::metrics;

#[derive(Clone, Default)]
pub struct TokenBlacklist {
    /// token → expiry (seconds since epoch)
    inner: Arc<DashMap<String, i64>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `token` as revoked until `expires_at`.
    pub fn revoke(&self, token: &str, expires_at: i64) {
        self.inner
            .entry(token.to_string())
            .and_modify(|exp| *exp = (*exp).max(expires_at))
            .or_insert(expires_at);
        metrics::record_revoked_tokens(self.inner.len());
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.inner.contains_key(token)
    }

    /// Drop entries whose token expired before `now`. Returns how many went.
    pub fn prune(&self, now: i64) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, exp| *exp >= now);
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.inner.len(), "Pruned revoked tokens");
            metrics::record_revoked_tokens(self.inner.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_check() {
        let list = TokenBlacklist::new();
        assert!(!list.is_revoked("t1"));

        list.revoke("t1", 100);
        assert!(list.is_revoked("t1"));
        assert!(!list.is_revoked("t2"));
    }

    #[test]
    fn test_prune_drops_only_expired() {
        let list = TokenBlacklist::new();
        list.revoke("old", 100);
        list.revoke("fresh", 500);

        assert_eq!(list.prune(200), 1);
        assert!(!list.is_revoked("old"));
        assert!(list.is_revoked("fresh"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_revoke_twice_keeps_later_expiry() {
        let list = TokenBlacklist::new();
        list.revoke("t", 500);
        list.revoke("t", 100);

        assert_eq!(list.prune(200), 0);
        assert!(list.is_revoked("t"));
    }
}
