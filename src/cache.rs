use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use ahash::AHashMap;

use crate::builder::CacheBuilder;
use crate::engine::Core;
use crate::error::CacheResult;
use crate::listener::{NoopListener, RemovalListener};
use crate::loader::{Loader, NoLoader};
use crate::metrics::stats::Metrics;
use crate::weigher::{UnitWeigher, Weigher};

/// A single-threaded LRU cache bounded by total entry weight.
///
/// Every operation takes `&mut self`, so no locking is involved.  Use
/// [`SyncLruCache`](crate::SyncLruCache) to share one cache between threads.
///
/// # Example
/// ```
/// use lungo::LruCache;
///
/// let mut cache: LruCache<&str, u32> = LruCache::new(2).unwrap();
/// cache.put("a", 1).unwrap();
/// cache.put("b", 2).unwrap();
/// cache.put("c", 3).unwrap();
///
/// assert_eq!(cache.get(&"a").unwrap(), None);
/// assert_eq!(cache.get(&"b").unwrap().as_deref(), Some(&2));
/// assert_eq!(cache.eviction_count(), 1);
/// ```
pub struct LruCache<K, V> {
    core: Core<K, V>,
    loader: Box<dyn Loader<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: fmt::Debug + 'static,
{
    /// Creates a cache holding at most `max_weight` unit-weight entries.
    pub fn new(max_weight: i64) -> CacheResult<Self> {
        Self::from_parts(
            max_weight,
            Box::new(UnitWeigher),
            Box::new(NoopListener),
            Box::new(NoLoader),
        )
    }

    /// Returns a [`CacheBuilder`] for constructing a new cache.
    pub fn builder(max_weight: i64) -> CacheBuilder<K, V> {
        CacheBuilder::new(max_weight)
    }

    pub(crate) fn from_parts(
        max_weight: i64,
        weigher: Box<dyn Weigher<K, V>>,
        listener: Box<dyn RemovalListener<K, V>>,
        loader: Box<dyn Loader<K, V>>,
    ) -> CacheResult<Self> {
        Ok(LruCache {
            core: Core::new(max_weight, weigher, listener)?,
            loader,
        })
    }

    /// Returns the value for `key`, marking it most-recently-used.
    ///
    /// On a miss the loader is asked for a value; a loaded value is inserted
    /// and may immediately trigger evictions.
    pub fn get(&mut self, key: &K) -> CacheResult<Option<Arc<V>>> {
        if let Some(value) = self.core.lookup(key) {
            return Ok(Some(value));
        }
        let Some(created) = self.loader.load(key) else {
            return Ok(None);
        };
        self.core.record_create();
        self.core.publish_created(key.clone(), created).map(Some)
    }

    /// Stores `value` for `key` and returns the value it replaced.
    pub fn put(&mut self, key: K, value: V) -> CacheResult<Option<Arc<V>>> {
        self.core.put(key, value)
    }

    /// Removes the entry for `key`, if present.
    pub fn remove(&mut self, key: &K) -> CacheResult<Option<Arc<V>>> {
        self.core.remove(key)
    }

    /// Changes the budget, evicting entries if it shrank.
    pub fn resize(&mut self, max_weight: i64) -> CacheResult<()> {
        self.core.resize(max_weight)
    }

    /// Evicts least-recently-used entries until `size() <= max_weight`.
    ///
    /// Passing `-1` evicts every entry.  The budget itself is unchanged.
    pub fn trim_to_size(&mut self, max_weight: i64) -> CacheResult<()> {
        self.core.trim_to_size(max_weight)
    }

    /// Evicts every entry.  Counters and budget are kept.
    pub fn evict_all(&mut self) -> CacheResult<()> {
        self.core.evict_all()
    }

    /// Returns the value for `key` without updating recency or statistics.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.core.peek(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.core.contains(key)
    }

    pub fn entry_count(&self) -> usize {
        self.core.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.core.entry_count() == 0
    }

    /// Copies the current entries, least-recently-used first.
    pub fn snapshot(&self) -> Vec<(K, Arc<V>)> {
        self.core.snapshot()
    }

    /// Copies the current entries into a map.
    pub fn snapshot_map(&self) -> AHashMap<K, Arc<V>> {
        self.core.snapshot_map()
    }
}

impl<K, V> LruCache<K, V> {
    /// Sum of the weights of all entries.
    pub fn size(&self) -> i64 {
        self.core.size()
    }

    /// Current budget.
    pub fn max_size(&self) -> i64 {
        self.core.max_size()
    }

    pub fn hit_count(&self) -> u64 {
        self.core.stats().hits()
    }

    pub fn miss_count(&self) -> u64 {
        self.core.stats().misses()
    }

    pub fn create_count(&self) -> u64 {
        self.core.stats().creates()
    }

    pub fn put_count(&self) -> u64 {
        self.core.stats().puts()
    }

    pub fn eviction_count(&self) -> u64 {
        self.core.stats().evictions()
    }

    pub fn stats(&self) -> Metrics {
        self.core.metrics()
    }

    /// Renders budget, hits, misses and the truncated hit rate.
    pub fn describe(&self) -> String {
        self.core.to_string()
    }
}

impl<K, V> fmt::Display for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.core, f)
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("size", &self.core.size())
            .field("max_size", &self.core.max_size())
            .field("stats", &self.core.metrics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    #[test]
    fn new_rejects_zero_budget() {
        assert_eq!(
            LruCache::<u32, u32>::new(0).err(),
            Some(CacheError::InvalidArgument { max_weight: 0 })
        );
    }

    #[test]
    fn loaded_values_count_as_creates() {
        let mut cache: LruCache<u32, String> = CacheBuilder::new(2)
            .loader(|k: &u32| (k % 2 == 0).then(|| format!("even-{k}")))
            .build()
            .unwrap();

        assert_eq!(cache.get(&4).unwrap().as_deref().map(String::as_str), Some("even-4"));
        assert_eq!(cache.get(&3).unwrap(), None);
        assert_eq!(cache.create_count(), 1);
        assert_eq!(cache.miss_count(), 2);
        assert!(cache.contains(&4));
        assert!(!cache.contains(&3));

        // The loaded value is now cached.
        assert!(cache.get(&4).unwrap().is_some());
        assert_eq!(cache.hit_count(), 1);
    }

    #[test]
    fn peek_does_not_promote() {
        let mut cache: LruCache<u32, u32> = LruCache::new(2).unwrap();
        cache.put(1, 1).unwrap();
        cache.put(2, 2).unwrap();
        assert_eq!(cache.peek(&1).as_deref(), Some(&1));
        cache.put(3, 3).unwrap();
        assert!(!cache.contains(&1), "peek must not protect an entry");
        assert_eq!(cache.hit_count(), 0);
    }

    #[test]
    fn trim_to_size_keeps_budget() {
        let mut cache: LruCache<u32, u32> = LruCache::new(10).unwrap();
        for i in 0..6 {
            cache.put(i, i).unwrap();
        }
        cache.trim_to_size(4).unwrap();
        assert_eq!(cache.size(), 4);
        assert_eq!(cache.max_size(), 10);
        cache.trim_to_size(-1).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn debug_and_display() {
        let cache: LruCache<u32, u32> = LruCache::new(7).unwrap();
        assert_eq!(cache.describe(), "LruCache[maxSize=7,hits=0,misses=0,hitRate=0%]");
        assert_eq!(cache.to_string(), cache.describe());
        assert!(format!("{cache:?}").contains("max_size: 7"));
    }
}
