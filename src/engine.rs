use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use ahash::AHashMap;
use tracing::{debug, error, trace};

use crate::error::{check_max_weight, CacheError, CacheResult};
use crate::listener::RemovalListener;
use crate::metrics::stats::{Metrics, StatsCounter};
use crate::store::linked::LinkedStore;
use crate::weigher::Weigher;

/// Trim target that forces every entry out, zero-weight ones included.
pub(crate) const EVICT_ALL: i64 = -1;

/// The eviction engine shared by [`LruCache`] and [`SyncLruCache`].
///
/// Holds the recency-ordered store, the weight accounting and the counters.
/// Every method runs to completion before the next one starts: the
/// single-threaded handle borrows it mutably and the shared handle keeps it
/// behind one mutex.  The loader is not part of the engine so the shared
/// handle can run it unlocked.
///
/// [`LruCache`]: crate::LruCache
/// [`SyncLruCache`]: crate::SyncLruCache
pub(crate) struct Core<K, V> {
    store: LinkedStore<K, V>,
    /// Always the sum of `weigher.weigh` over every entry in `store`.
    total_weight: i64,
    max_weight: i64,
    weigher: Box<dyn Weigher<K, V>>,
    listener: Box<dyn RemovalListener<K, V>>,
    stats: StatsCounter,
}

impl<K, V> Core<K, V> {
    pub(crate) fn size(&self) -> i64 {
        self.total_weight
    }

    pub(crate) fn max_size(&self) -> i64 {
        self.max_weight
    }

    pub(crate) fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    pub(crate) fn metrics(&self) -> Metrics {
        self.stats.snapshot()
    }
}

impl<K, V> Core<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: fmt::Debug + 'static,
{
    pub(crate) fn new(
        max_weight: i64,
        weigher: Box<dyn Weigher<K, V>>,
        listener: Box<dyn RemovalListener<K, V>>,
    ) -> CacheResult<Self> {
        Ok(Core {
            store: LinkedStore::new(),
            total_weight: 0,
            max_weight: check_max_weight(max_weight)?,
            weigher,
            listener,
            stats: StatsCounter::new(),
        })
    }

    fn weigh(&self, key: &K, value: &V) -> CacheResult<i64> {
        let weight = self.weigher.weigh(key, value);
        if weight < 0 {
            return Err(CacheError::InvalidWeight {
                entry: format!("{key:?}={value:?}"),
                weight,
            });
        }
        Ok(weight)
    }

    /// The total after swapping `removed` units for `added` ones.
    fn adjusted_total(&self, added: i64, removed: i64) -> CacheResult<i64> {
        self.total_weight
            .checked_sub(removed)
            .and_then(|total| total.checked_add(added))
            .ok_or(CacheError::WeightOverflow {
                total_weight: self.total_weight,
                weight: added,
            })
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Returns the value for `key`, promoting it and counting a hit, or
    /// counts a miss.
    pub(crate) fn lookup(&mut self, key: &K) -> Option<Arc<V>> {
        match self.store.get(key) {
            Some(value) => {
                let value = Arc::clone(value);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    pub(crate) fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.store.peek(key).cloned()
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.store.len()
    }

    /// Copies every entry, least-recently-used first.
    pub(crate) fn snapshot(&self) -> Vec<(K, Arc<V>)> {
        self.store
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }

    pub(crate) fn snapshot_map(&self) -> AHashMap<K, Arc<V>> {
        self.store
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub(crate) fn record_create(&mut self) {
        self.stats.record_create();
    }

    /// Publishes a value produced by the loader after a miss on `key`.
    ///
    /// If another writer stored `key` since the miss, its value wins: the
    /// created value is handed to the listener as replaced and the existing
    /// value is returned.
    pub(crate) fn publish_created(&mut self, key: K, created: V) -> CacheResult<Arc<V>> {
        if let Some(existing) = self.store.get(&key) {
            let existing = Arc::clone(existing);
            trace!(key = ?key, "discarding loaded value, key already present");
            self.listener
                .on_removal(false, &key, Arc::new(created), Some(Arc::clone(&existing)));
            return Ok(existing);
        }

        let weight = self.weigh(&key, &created)?;
        let total = self.adjusted_total(weight, 0)?;
        let created = Arc::new(created);
        self.store.insert(key, Arc::clone(&created));
        self.total_weight = total;
        self.trim_to_size(self.max_weight)?;
        Ok(created)
    }

    pub(crate) fn put(&mut self, key: K, value: V) -> CacheResult<Option<Arc<V>>> {
        self.stats.record_put();

        let weight = self.weigh(&key, &value)?;
        let previous_weight = match self.store.peek(&key) {
            Some(previous) => Some(self.weigh(&key, previous)?),
            None => None,
        };

        let total = self.adjusted_total(weight, previous_weight.unwrap_or(0))?;

        let value = Arc::new(value);
        let replaced = self.store.insert(key, Arc::clone(&value));
        self.total_weight = total;

        if let Some((key, previous)) = &replaced {
            self.listener
                .on_removal(false, key, Arc::clone(previous), Some(value));
        }

        self.trim_to_size(self.max_weight)?;
        Ok(replaced.map(|(_, previous)| previous))
    }

    pub(crate) fn remove(&mut self, key: &K) -> CacheResult<Option<Arc<V>>> {
        let weight = match self.store.peek(key) {
            Some(value) => self.weigh(key, value)?,
            None => return Ok(None),
        };
        let Some(value) = self.store.remove(key) else {
            return Ok(None);
        };
        self.total_weight -= weight;
        self.listener
            .on_removal(false, key, Arc::clone(&value), None);
        Ok(Some(value))
    }

    pub(crate) fn resize(&mut self, max_weight: i64) -> CacheResult<()> {
        let max_weight = check_max_weight(max_weight)?;
        debug!(
            old = self.max_weight,
            new = max_weight,
            size = self.total_weight,
            "resizing cache"
        );
        self.max_weight = max_weight;
        self.trim_to_size(max_weight)
    }

    pub(crate) fn evict_all(&mut self) -> CacheResult<()> {
        debug!(entries = self.store.len(), "evicting all entries");
        self.trim_to_size(EVICT_ALL)
    }

    /// Evicts least-recently-used entries until the total weight is at or
    /// below `target`.
    ///
    /// Entries evicted before an error is detected stay evicted.
    pub(crate) fn trim_to_size(&mut self, target: i64) -> CacheResult<()> {
        loop {
            if self.total_weight < 0 || (self.store.is_empty() && self.total_weight != 0) {
                error!(
                    total_weight = self.total_weight,
                    entries = self.store.len(),
                    "weigher is returning inconsistent results"
                );
                return Err(CacheError::InconsistentSize {
                    total_weight: self.total_weight,
                    entries: self.store.len(),
                });
            }

            if self.total_weight <= target {
                return Ok(());
            }

            let weight = match self.store.peek_lru() {
                Some((key, value)) => self.weigh(key, value)?,
                None => return Ok(()),
            };
            let Some((key, value)) = self.store.pop_lru() else {
                return Ok(());
            };
            self.total_weight -= weight;
            self.stats.record_eviction();
            trace!(key = ?key, weight, remaining = self.total_weight, "evicted entry");
            self.listener.on_removal(true, &key, value, None);
        }
    }
}

impl<K, V> fmt::Display for Core<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LruCache[maxSize={},hits={},misses={},hitRate={}%]",
            self.max_weight,
            self.stats.hits(),
            self.stats.misses(),
            self.stats.hit_rate_percent()
        )
    }
}
