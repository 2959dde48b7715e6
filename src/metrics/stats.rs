/// Counters updated on every cache operation.
///
/// They only ever grow.  The owning engine is either exclusively borrowed or
/// sits behind the shared handle's mutex, so plain integers are enough.
#[derive(Debug, Default, Clone)]
pub struct StatsCounter {
    puts: u64,
    creates: u64,
    evictions: u64,
    hits: u64,
    misses: u64,
}

impl StatsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    #[inline]
    pub fn record_create(&mut self) {
        self.creates += 1;
    }

    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn puts(&self) -> u64 {
        self.puts
    }

    pub fn creates(&self) -> u64 {
        self.creates
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// `floor(100 * hits / (hits + misses))`, or 0 before the first lookup.
    pub fn hit_rate_percent(&self) -> u64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0
        } else {
            100 * self.hits / total
        }
    }

    /// Returns a point-in-time snapshot of the statistics.
    pub fn snapshot(&self) -> Metrics {
        Metrics {
            puts: self.puts,
            creates: self.creates,
            evictions: self.evictions,
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate_percent(),
        }
    }
}

/// A point-in-time snapshot of cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Number of `put` calls.
    pub puts: u64,
    /// Number of values produced by the loader.
    pub creates: u64,
    /// Number of entries dropped to stay within budget.
    pub evictions: u64,
    /// Number of lookups that found the key.
    pub hits: u64,
    /// Number of lookups that did not find the key.
    pub misses: u64,
    /// Truncated hit percentage, `0..=100`.
    pub hit_rate: u64,
}

impl Metrics {
    pub fn request_count(&self) -> u64 {
        self.hits + self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_without_lookups() {
        assert_eq!(StatsCounter::new().hit_rate_percent(), 0);
    }

    #[test]
    fn hit_rate_truncates() {
        let mut stats = StatsCounter::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate_percent(), 50);

        stats.record_hit();
        // 2 / 3 = 66.6…
        assert_eq!(stats.hit_rate_percent(), 66);
        assert_eq!(stats.snapshot().request_count(), 3);
    }
}
