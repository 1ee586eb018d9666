use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use labconfig::CacheSettings;
use tracing::{trace, warn};

/// Names a cache slot and the type stored in it, so readers and writers of
/// the same key cannot disagree about the value's type.
pub struct CacheKey<T> {
    name: Cow<'static, str>,
    _value: PhantomData<fn() -> T>,
}

impl<T> CacheKey<T> {
    pub const fn new_static(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _value: PhantomData,
        }
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> fmt::Debug for CacheKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    stored_at: Instant,
}

/// Memoization store for derived values. Values are immutable once stored and
/// handed out as `Arc`s; replacing a key never affects readers holding the old
/// value.
pub struct CacheManager {
    entries: HashMap<String, CacheEntry>,
    ttl: Option<Duration>,
    capacity: Option<usize>,
    stats: CacheStats,
}

impl CacheManager {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            ttl: None,
            capacity: None,
            stats: CacheStats::default(),
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        let mut cache = Self::new();
        cache.ttl = settings.ttl;
        cache.capacity = settings.capacity.filter(|&capacity| capacity > 0);
        cache
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity.max(1));
        self
    }

    pub fn get<T>(&mut self, key: &CacheKey<T>) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get_at(key, Instant::now())
    }

    pub fn get_at<T>(&mut self, key: &CacheKey<T>, now: Instant) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let Some(entry) = self.entries.get(key.name()) else {
            self.stats.misses += 1;
            trace!(key = key.name(), "cache miss");
            return None;
        };

        if let Some(ttl) = self.ttl {
            if now.saturating_duration_since(entry.stored_at) > ttl {
                self.entries.remove(key.name());
                self.stats.misses += 1;
                trace!(key = key.name(), "cache entry expired");
                return None;
            }
        }

        match Arc::clone(&entry.value).downcast::<T>() {
            Ok(value) => {
                self.stats.hits += 1;
                trace!(key = key.name(), "cache hit");
                Some(value)
            }
            Err(_) => {
                self.stats.misses += 1;
                warn!(key = key.name(), "cache entry holds a different type; ignoring");
                None
            }
        }
    }

    /// Stores `value` and returns the shared handle now held by the cache.
    pub fn set<T>(&mut self, key: &CacheKey<T>, value: T) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        self.set_at(key, value, Instant::now())
    }

    pub fn set_at<T>(&mut self, key: &CacheKey<T>, value: T, now: Instant) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        if let Some(capacity) = self.capacity {
            if !self.entries.contains_key(key.name()) && self.entries.len() >= capacity {
                self.evict_oldest();
            }
        }

        let value = Arc::new(value);
        self.entries.insert(
            key.name().to_string(),
            CacheEntry {
                value: value.clone(),
                stored_at: now,
            },
        );
        value
    }

    pub fn invalidate(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|name, _| !name.starts_with(prefix));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(name, _)| name.clone());
        if let Some(name) = oldest {
            self.entries.remove(&name);
            self.stats.evictions += 1;
            trace!(key = %name, "evicted oldest cache entry");
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("CacheManager")
            .field("keys", &keys)
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}
