use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;
use std::hash::Hash;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Expiring key/value slots for the short-lived auth handoffs. Expired
/// entries are evicted on insert and on read, so the map stays bounded by
/// live traffic rather than growing until restart.
pub struct TtlMap<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    ttl_secs: i64,
}

struct Entry<V> {
    value: V,
    expires: i64,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    pub fn new(ttl_secs: i64) -> Self {
        TtlMap {
            entries: RwLock::new(HashMap::new()),
            ttl_secs,
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        let now = Utc::now().timestamp();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires > now);
        entries.insert(
            key,
            Entry {
                value,
                expires: now + self.ttl_secs,
            },
        );
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Utc::now().timestamp();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires > now);
        entries.get(key).map(|entry| entry.value.clone())
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        let now = Utc::now().timestamp();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires > now);
        entries.remove(key).map(|entry| entry.value)
    }

    #[cfg(test)]
    async fn force_expire(&self, key: &K) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.expires = Utc::now().timestamp() - 1;
        }
    }
}

/// Bridges the pre-redirect username choice to the post-callback account
/// creation step. The slot key is an opaque handle given to the client.
pub struct PendingUsernames {
    slots: TtlMap<String, String>,
}

impl PendingUsernames {
    pub fn new(ttl_secs: i64) -> Self {
        PendingUsernames {
            slots: TtlMap::new(ttl_secs),
        }
    }

    pub async fn reserve(&self, username: String) -> String {
        let handle = Uuid::new_v4().to_string();
        self.slots.insert(handle.clone(), username).await;
        handle
    }

    pub async fn take(&self, handle: &str) -> Option<String> {
        self.slots.remove(&handle.to_string()).await
    }
}

/// Email verification codes, keyed by address. A code is consumed on
/// successful verification; a mismatch leaves it in place for a retry.
pub struct VerificationCodes {
    codes: TtlMap<String, String>,
}

impl VerificationCodes {
    pub fn new(ttl_secs: i64) -> Self {
        VerificationCodes {
            codes: TtlMap::new(ttl_secs),
        }
    }

    pub async fn issue(&self, email: &str) -> String {
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000));
        self.codes.insert(email.to_string(), code.clone()).await;
        code
    }

    pub async fn verify(&self, email: &str, code: &str) -> bool {
        let email = email.to_string();
        match self.codes.get(&email).await {
            Some(expected) if expected == code => {
                self.codes.remove(&email).await;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_take() {
        let map: TtlMap<String, i32> = TtlMap::new(60);
        map.insert("a".to_string(), 1).await;
        assert_eq!(map.get(&"a".to_string()).await, Some(1));
        assert_eq!(map.remove(&"a".to_string()).await, Some(1));
        assert_eq!(map.get(&"a".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let map: TtlMap<String, i32> = TtlMap::new(60);
        map.insert("a".to_string(), 1).await;
        map.force_expire(&"a".to_string()).await;
        assert_eq!(map.get(&"a".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_insert_evicts_expired_entries() {
        let map: TtlMap<String, i32> = TtlMap::new(60);
        map.insert("stale".to_string(), 1).await;
        map.force_expire(&"stale".to_string()).await;
        map.insert("fresh".to_string(), 2).await;

        let entries = map.entries.read().await;
        assert!(!entries.contains_key("stale"));
        assert!(entries.contains_key("fresh"));
    }

    #[tokio::test]
    async fn test_pending_username_slot_is_single_use() {
        let pending = PendingUsernames::new(60);
        let handle = pending.reserve("책벌레".to_string()).await;
        assert_eq!(pending.take(&handle).await, Some("책벌레".to_string()));
        assert_eq!(pending.take(&handle).await, None);
    }

    #[tokio::test]
    async fn test_verification_code_mismatch_keeps_code() {
        let codes = VerificationCodes::new(60);
        let code = codes.issue("a@b.co").await;
        let wrong = if code == "111111" { "222222" } else { "111111" };
        assert!(!codes.verify("a@b.co", wrong).await);
        assert!(codes.verify("a@b.co", &code).await);
        assert!(!codes.verify("a@b.co", &code).await);
    }
}
