//! Per-seed sampler cache
//!
//! Building a sampler means drawing its whole table from the seeded
//! generator, so tables are kept behind `Arc` in a small LRU keyed by seed.
//! Entries are never mutated; a new seed builds a new table.

use super::NoiseSampler;
use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of seeds kept per field
pub const DEFAULT_CAPACITY: usize = 8;

pub struct SamplerCache<S> {
    entries: Mutex<LruCache<u32, Arc<S>>>,
}

impl<S: NoiseSampler> SamplerCache<S> {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Cached sampler for `seed`, built on a miss
    pub fn get(&self, seed: u32) -> Arc<S> {
        let mut entries = self.entries.lock();
        if let Some(sampler) = entries.get(&seed) {
            return Arc::clone(sampler);
        }

        tracing::debug!(seed, "building noise sampler");
        let sampler = Arc::new(S::from_seed(seed));
        entries.put(seed, Arc::clone(&sampler));
        sampler
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<S: NoiseSampler> Default for SamplerCache<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<S> fmt::Debug for SamplerCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerCache")
            .field("len", &self.entries.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorleyNoise;

    #[test]
    fn test_same_seed_shares_table() {
        let cache: SamplerCache<WorleyNoise> = SamplerCache::default();
        let a = cache.get(7);
        let b = cache.get(7);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache: SamplerCache<WorleyNoise> = SamplerCache::new(2);
        let first = cache.get(1);
        cache.get(2);
        cache.get(3);
        assert_eq!(cache.len(), 2);

        // Seed 1 was evicted and is rebuilt as a fresh, equal table
        let again = cache.get(1);
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(first.points(), again.points());
    }
}
