//! In-memory document store, used by tests and as a fallback

use std::{
    collections::HashMap,
    sync::Mutex,
};

use super::{StorageError, StoragePort};

/// HashMap-backed [`StoragePort`] with an optional total-size quota
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once the total stored size would exceed `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StoragePort for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut docs = self.lock();

        if let Some(quota) = self.quota_bytes {
            let others: usize = docs
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                });
            }
        }

        docs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_rejects_oversized_writes() {
        let store = MemoryStore::with_quota(8);
        store.set("a", "1234").unwrap();
        store.set("a", "12345678").unwrap();

        let err = store.set("b", "x").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { ref key, size: 1 } if key == "b"));
        assert_eq!(store.get("b").unwrap(), None);
    }
}
