use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::builder::CacheBuilder;
use crate::engine::Core;
use crate::error::CacheResult;
use crate::listener::{NoopListener, RemovalListener};
use crate::loader::{Loader, NoLoader};
use crate::metrics::stats::Metrics;
use crate::weigher::{UnitWeigher, Weigher};

/// Shared interior of a [`SyncLruCache`].
struct Inner<K, V> {
    /// Map, weights and counters form one critical section.
    core: Mutex<Core<K, V>>,
    /// Runs outside the lock; its result is re-validated under it.
    loader: Box<dyn Loader<K, V>>,
}

/// A thread-safe LRU cache bounded by total entry weight.
///
/// All state lives behind a single mutex, so every operation observes the
/// cache either before or after any other operation, never half-way through
/// an eviction.  The only work done outside the lock is running the loader
/// after a miss.
///
/// # Example
/// ```
/// use lungo::SyncLruCache;
/// use std::sync::Arc;
///
/// let cache: SyncLruCache<String, String> = SyncLruCache::new(100).unwrap();
/// cache.put("hello".to_string(), "world".to_string()).unwrap();
/// assert_eq!(
///     cache.get(&"hello".to_string()).unwrap(),
///     Some(Arc::new("world".to_string()))
/// );
/// ```
pub struct SyncLruCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for SyncLruCache<K, V> {
    fn clone(&self) -> Self {
        SyncLruCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SyncLruCache<K, V>
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
        Ok(SyncLruCache {
            inner: Arc::new(Inner {
                core: Mutex::new(Core::new(max_weight, weigher, listener)?),
                loader,
            }),
        })
    }

    /// Returns the value for `key`, marking it most-recently-used.
    ///
    /// On a miss the lock is released while the loader runs.  If another
    /// caller stores `key` in the meantime, that value is kept and returned,
    /// and the loaded one is passed to the removal listener.
    pub fn get(&self, key: &K) -> CacheResult<Option<Arc<V>>> {
        let hit = self.inner.core.lock().lookup(key);
        if hit.is_some() {
            return Ok(hit);
        }

        let Some(created) = self.inner.loader.load(key) else {
            return Ok(None);
        };

        let mut core = self.inner.core.lock();
        core.record_create();
        core.publish_created(key.clone(), created).map(Some)
    }

    /// Stores `value` for `key` and returns the value it replaced.
    pub fn put(&self, key: K, value: V) -> CacheResult<Option<Arc<V>>> {
        self.inner.core.lock().put(key, value)
    }

    /// Removes the entry for `key`, if present.
    pub fn remove(&self, key: &K) -> CacheResult<Option<Arc<V>>> {
        self.inner.core.lock().remove(key)
    }

    /// Changes the budget, evicting entries if it shrank.
    pub fn resize(&self, max_weight: i64) -> CacheResult<()> {
        self.inner.core.lock().resize(max_weight)
    }

    /// Evicts least-recently-used entries until `size() <= max_weight`.
    ///
    /// Passing `-1` evicts every entry.  The budget itself is unchanged.
    pub fn trim_to_size(&self, max_weight: i64) -> CacheResult<()> {
        self.inner.core.lock().trim_to_size(max_weight)
    }

    /// Evicts every entry.  Counters and budget are kept.
    pub fn evict_all(&self) -> CacheResult<()> {
        self.inner.core.lock().evict_all()
    }

    /// Returns the value for `key` without updating recency or statistics.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.inner.core.lock().peek(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.core.lock().contains(key)
    }

    pub fn entry_count(&self) -> usize {
        self.inner.core.lock().entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Copies the current entries, least-recently-used first.
    pub fn snapshot(&self) -> Vec<(K, Arc<V>)> {
        self.inner.core.lock().snapshot()
    }

    /// Copies the current entries into a map.
    pub fn snapshot_map(&self) -> AHashMap<K, Arc<V>> {
        self.inner.core.lock().snapshot_map()
    }
}

impl<K, V> SyncLruCache<K, V> {
    /// Sum of the weights of all entries.
    pub fn size(&self) -> i64 {
        self.inner.core.lock().size()
    }

    /// Current budget.
    pub fn max_size(&self) -> i64 {
        self.inner.core.lock().max_size()
    }

    pub fn hit_count(&self) -> u64 {
        self.inner.core.lock().stats().hits()
    }

    pub fn miss_count(&self) -> u64 {
        self.inner.core.lock().stats().misses()
    }

    pub fn create_count(&self) -> u64 {
        self.inner.core.lock().stats().creates()
    }

    pub fn put_count(&self) -> u64 {
        self.inner.core.lock().stats().puts()
    }

    pub fn eviction_count(&self) -> u64 {
        self.inner.core.lock().stats().evictions()
    }

    /// Returns all counters read under one lock acquisition.
    pub fn stats(&self) -> Metrics {
        self.inner.core.lock().metrics()
    }

    /// Renders budget, hits, misses and the truncated hit rate.
    pub fn describe(&self) -> String {
        self.inner.core.lock().to_string()
    }
}

impl<K, V> fmt::Display for SyncLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner.core.lock(), f)
    }
}

impl<K, V> fmt::Debug for SyncLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.core.lock();
        f.debug_struct("SyncLruCache")
            .field("size", &core.size())
            .field("max_size", &core.max_size())
            .field("stats", &core.metrics())
            .finish()
    }
}
