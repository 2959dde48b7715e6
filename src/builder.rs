use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::cache::LruCache;
use crate::error::CacheResult;
use crate::listener::{FnListener, NoopListener, RemovalListener};
use crate::loader::{FnLoader, Loader, NoLoader};
use crate::sync::SyncLruCache;
use crate::weigher::{FnWeigher, UnitWeigher, Weigher};

/// Builder for configuring and constructing an [`LruCache`] or a
/// [`SyncLruCache`].
///
/// The budget is validated when the cache is built.
///
/// # Example
/// ```
/// use lungo::CacheBuilder;
///
/// let cache: lungo::SyncLruCache<String, String> = CacheBuilder::new(1_000)
///     .weigher(|k: &String, v: &String| (k.len() + v.len()) as i64)
///     .build_sync()
///     .unwrap();
/// assert_eq!(cache.max_size(), 1_000);
/// ```
pub struct CacheBuilder<K, V> {
    max_weight: i64,
    weigher: Box<dyn Weigher<K, V>>,
    listener: Box<dyn RemovalListener<K, V>>,
    loader: Box<dyn Loader<K, V>>,
}

impl<K: 'static, V: 'static> CacheBuilder<K, V> {
    pub fn new(max_weight: i64) -> Self {
        CacheBuilder {
            max_weight,
            weigher: Box::new(UnitWeigher),
            listener: Box::new(NoopListener),
            loader: Box::new(NoLoader),
        }
    }

    /// Set a custom entry weigher via closure.
    ///
    /// # Example
    /// ```
    /// use lungo::CacheBuilder;
    ///
    /// let cache: lungo::LruCache<String, Vec<u8>> = CacheBuilder::new(4096)
    ///     .weigher(|_k: &String, v: &Vec<u8>| v.len() as i64)
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn weigher<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, &V) -> i64 + Send + Sync + 'static,
    {
        self.weigher = Box::new(FnWeigher(f));
        self
    }

    /// Set a weigher using any type that implements the [`Weigher`] trait.
    pub fn weigher_impl<W: Weigher<K, V>>(mut self, w: W) -> Self {
        self.weigher = Box::new(w);
        self
    }

    /// Register a removal listener closure.
    ///
    /// The closure is called synchronously each time an entry leaves the
    /// cache for any reason (eviction, replacement by `put`, explicit
    /// removal, or a loaded value losing a race).  Do **not** call cache
    /// methods from within the closure.
    ///
    /// # Example
    /// ```
    /// use lungo::CacheBuilder;
    ///
    /// let cache: lungo::LruCache<u64, u64> = CacheBuilder::new(10)
    ///     .removal_listener(|evicted, key: &u64, _old, _new| {
    ///         println!("removed key={key} evicted={evicted}");
    ///     })
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn removal_listener<F>(mut self, f: F) -> Self
    where
        F: Fn(bool, &K, Arc<V>, Option<Arc<V>>) + Send + Sync + 'static,
    {
        self.listener = Box::new(FnListener(f));
        self
    }

    /// Register a removal listener via the [`RemovalListener`] trait.
    pub fn removal_listener_impl<L: RemovalListener<K, V>>(mut self, l: L) -> Self {
        self.listener = Box::new(l);
        self
    }

    /// Set the closure that produces values for keys that miss.
    pub fn loader<F>(mut self, f: F) -> Self
    where
        F: Fn(&K) -> Option<V> + Send + Sync + 'static,
    {
        self.loader = Box::new(FnLoader(f));
        self
    }

    /// Set a loader using any type that implements the [`Loader`] trait.
    pub fn loader_impl<L: Loader<K, V>>(mut self, l: L) -> Self {
        self.loader = Box::new(l);
        self
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: fmt::Debug + 'static,
{
    /// Builds a single-threaded cache.
    pub fn build(self) -> CacheResult<LruCache<K, V>> {
        LruCache::from_parts(self.max_weight, self.weigher, self.listener, self.loader)
    }

    /// Builds a cache that can be shared between threads.
    pub fn build_sync(self) -> CacheResult<SyncLruCache<K, V>> {
        SyncLruCache::from_parts(self.max_weight, self.weigher, self.listener, self.loader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    struct Halves;

    impl Loader<u32, u32> for Halves {
        fn load(&self, key: &u32) -> Option<u32> {
            Some(key / 2)
        }
    }

    #[test]
    fn build_validates_budget() {
        let err = CacheBuilder::<u32, u32>::new(-3).build().err();
        assert_eq!(err, Some(CacheError::InvalidArgument { max_weight: -3 }));
        assert!(CacheBuilder::<u32, u32>::new(0).build_sync().is_err());
    }

    #[test]
    fn trait_impls_are_wired_in() {
        let mut cache = CacheBuilder::<u32, u32>::new(10)
            .loader_impl(Halves)
            .weigher_impl(UnitWeigher)
            .removal_listener_impl(NoopListener)
            .build()
            .unwrap();
        assert_eq!(cache.get(&9).unwrap().as_deref(), Some(&4));
        assert_eq!(cache.size(), 1);
    }
}
