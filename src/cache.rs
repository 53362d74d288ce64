use crate::error::Result;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Bounded record of offers already posted to the group.
///
/// Keys are the untransformed product URLs. When the cache is full the
/// oldest key is evicted, so memory stays bounded while recent offers are
/// never re-posted. Insertion order is preserved so eviction order survives
/// a snapshot/restore round trip.
pub struct SentCache {
    keys: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SentCache {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be positive");
        Self {
            keys: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Restores a cache from a flat JSON snapshot (an array of keys in
    /// insertion order). A missing file yields an empty cache; a corrupt
    /// file is an error for the caller to report.
    pub fn load(path: &Path, capacity: usize) -> Result<Self> {
        let mut cache = Self::new(capacity);
        if !path.exists() {
            debug!(path = %path.display(), "no cache snapshot, starting empty");
            return Ok(cache);
        }
        let raw = fs::read_to_string(path)?;
        let keys: Vec<String> = serde_json::from_str(&raw)?;
        for key in keys {
            cache.insert(key);
        }
        debug!(path = %path.display(), len = cache.len(), "restored cache snapshot");
        Ok(cache)
    }

    /// Writes the snapshot. Keys are stored oldest-first.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let keys: Vec<&String> = self.order.iter().collect();
        let raw = serde_json::to_string(&keys)?;
        fs::write(path, raw)?;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Records a key. Returns false when the key was already present.
    /// Evicts the oldest key when the cache is at capacity.
    pub fn insert(&mut self, key: String) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
        self.keys.insert(key.clone());
        self.order.push_back(key);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_new_and_duplicate_keys() {
        let mut cache = SentCache::new(10);
        assert!(cache.insert("a".into()));
        assert!(!cache.insert("a".into()));
        assert!(cache.contains("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut cache = SentCache::new(2);
        cache.insert("a".into());
        cache.insert("b".into());
        cache.insert("c".into());
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn duplicate_insert_does_not_evict() {
        let mut cache = SentCache::new(2);
        cache.insert("a".into());
        cache.insert("b".into());
        cache.insert("b".into());
        assert!(cache.contains("a"));
    }
}
