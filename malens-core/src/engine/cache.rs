//! SMA cache keyed by series identity and window.
//!
//! Entries are only valid for one series identity. Seeing a different
//! `SeriesHash` drops every entry; there is no time-based expiry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::SeriesHash;
use crate::indicators::SmaSeries;

#[derive(Debug, Default)]
pub struct SmaCache {
    identity: Option<SeriesHash>,
    entries: HashMap<usize, Arc<SmaSeries>>,
    hits: u64,
    misses: u64,
}

impl SmaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the cache to a series identity, clearing it if the identity changed.
    ///
    /// Returns `true` when entries were invalidated.
    pub fn bind(&mut self, identity: &SeriesHash) -> bool {
        if self.identity.as_ref() == Some(identity) {
            return false;
        }
        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        self.identity = Some(identity.clone());
        had_entries
    }

    /// Look up a window for the bound identity.
    pub fn get(&mut self, identity: &SeriesHash, window: usize) -> Option<Arc<SmaSeries>> {
        if self.identity.as_ref() != Some(identity) {
            self.misses += 1;
            return None;
        }
        match self.entries.get(&window) {
            Some(sma) => {
                self.hits += 1;
                Some(Arc::clone(sma))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a window's series. Ignored if `identity` is not the bound one.
    pub fn put(&mut self, identity: &SeriesHash, sma: SmaSeries) -> Arc<SmaSeries> {
        let sma = Arc::new(sma);
        if self.identity.as_ref() == Some(identity) {
            self.entries.insert(sma.window, Arc::clone(&sma));
        }
        sma
    }

    pub fn identity(&self) -> Option<&SeriesHash> {
        self.identity.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sma(window: usize) -> SmaSeries {
        SmaSeries {
            window,
            values: vec![None, Some(1.0)],
        }
    }

    #[test]
    fn put_get_same_identity() {
        let id = SeriesHash::from_hash("aaa");
        let mut cache = SmaCache::new();
        cache.bind(&id);
        assert!(cache.get(&id, 2).is_none());
        cache.put(&id, sma(2));
        assert_eq!(cache.get(&id, 2).unwrap().window, 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn new_identity_clears_entries() {
        let a = SeriesHash::from_hash("aaa");
        let b = SeriesHash::from_hash("bbb");
        let mut cache = SmaCache::new();
        cache.bind(&a);
        cache.put(&a, sma(2));
        assert!(!cache.bind(&a));
        assert!(cache.bind(&b));
        assert!(cache.is_empty());
        assert!(cache.get(&a, 2).is_none());
    }

    #[test]
    fn put_for_stale_identity_is_not_stored() {
        let a = SeriesHash::from_hash("aaa");
        let b = SeriesHash::from_hash("bbb");
        let mut cache = SmaCache::new();
        cache.bind(&b);
        cache.put(&a, sma(2));
        assert!(cache.is_empty());
    }
}
