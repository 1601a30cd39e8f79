//! Caching infrastructure for performance optimization
//!
//! This module provides the TTL caches used to avoid repeated database
//! round-trips for data that changes rarely during a chat session.
//!
//! ## Cache Types
//!
//! - **Memory Cache**: In-memory TTL-based cache for fast access
//! - **Customer/Product caches**: grouped under [`CacheManager`]
//! - **Language preference cache**: a process-wide singleton keyed by
//!   telegram user id, consulted before the customers table
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use samna_salta::cache::{Cache, MemoryCache};
//!
//! // Create a memory cache for string keys and values
//! let mut cache: MemoryCache<String, String> = MemoryCache::new();
//! cache.insert("key".to_string(), "value".to_string(), std::time::Duration::from_secs(300));
//! ```

use lazy_static::lazy_static;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Generic cache entry with expiration time
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value
    pub value: T,
    /// When this entry expires
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Check if this entry has expired
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }

    /// Get the remaining time to live
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Generic cache trait
pub trait Cache<K, V> {
    /// Get a value from the cache
    fn get(&self, key: &K) -> Option<V>;

    /// Insert a value into the cache
    fn insert(&mut self, key: K, value: V, ttl: Duration);

    /// Remove a value from the cache
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Clear all expired entries
    fn cleanup(&mut self);

    /// Get cache statistics
    fn stats(&self) -> CacheStats;

    /// Clear all entries
    fn clear(&mut self);
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Total number of entries
    pub entries: usize,
    /// Number of hits
    pub hits: u64,
    /// Number of misses
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// Thread-safe in-memory cache implementation
pub struct MemoryCache<K, V> {
    data: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    V: Clone + std::fmt::Debug,
{
    /// Create a new memory cache
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Get cache size
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    V: Clone + std::fmt::Debug,
{
    fn get(&self, key: &K) -> Option<V> {
        let mut stats = self.stats.write();
        let data = self.data.read();

        match data.get(key) {
            Some(entry) if !entry.is_expired() => {
                stats.hits += 1;
                Some(entry.value.clone())
            }
            Some(_) => {
                // Entry exists but is expired
                stats.misses += 1;
                None
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        self.data.write().insert(key, entry);
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.data.write().remove(key).map(|entry| entry.value)
    }

    fn cleanup(&mut self) {
        let mut data = self.data.write();
        let initial_len = data.len();

        data.retain(|_, entry| !entry.is_expired());

        let removed = initial_len - data.len();
        if removed > 0 {
            tracing::debug!("Cache cleanup removed {} expired entries", removed);
        }
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        let data = self.data.read();

        stats.entries = data.len();

        let total_requests = stats.hits + stats.misses;
        if total_requests > 0 {
            stats.hit_rate = stats.hits as f64 / total_requests as f64;
        }

        stats
    }

    fn clear(&mut self) {
        self.data.write().clear();
        *self.stats.write() = CacheStats::default();
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    V: Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Cache manager grouping the per-entity caches
pub struct CacheManager {
    /// Customer rows keyed by telegram id
    pub customer_cache: MemoryCache<i64, crate::db::Customer>,
    /// Product rows keyed by product id
    pub product_cache: MemoryCache<i64, crate::db::Product>,
    /// TTL applied to customer entries
    pub customer_ttl: Duration,
    /// TTL applied to product entries
    pub product_ttl: Duration,
}

impl CacheManager {
    /// Create a new cache manager with default settings
    pub fn new() -> Self {
        Self {
            customer_cache: MemoryCache::new(),
            product_cache: MemoryCache::new(),
            customer_ttl: Duration::from_secs(300), // 5 minutes
            product_ttl: Duration::from_secs(600),  // 10 minutes
        }
    }

    /// Create a cache manager with custom TTLs
    pub fn with_config(customer_ttl: Duration, product_ttl: Duration) -> Self {
        Self {
            customer_cache: MemoryCache::new(),
            product_cache: MemoryCache::new(),
            customer_ttl,
            product_ttl,
        }
    }

    /// Drop a customer's cached row after their record changes
    pub fn invalidate_customer(&mut self, telegram_id: i64) {
        self.customer_cache.remove(&telegram_id);
    }

    /// Clean up all expired entries across all caches
    pub fn cleanup_all(&mut self) {
        self.customer_cache.cleanup();
        self.product_cache.cleanup();
    }

    /// Get comprehensive cache statistics
    pub fn stats(&self) -> CacheManagerStats {
        CacheManagerStats {
            customer_cache: self.customer_cache.stats(),
            product_cache: self.product_cache.stats(),
        }
    }

    /// Clear all caches
    pub fn clear_all(&mut self) {
        self.customer_cache.clear();
        self.product_cache.clear();
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Comprehensive cache statistics for the cache manager
#[derive(Debug, Clone)]
pub struct CacheManagerStats {
    /// Customer cache statistics
    pub customer_cache: CacheStats,
    /// Product cache statistics
    pub product_cache: CacheStats,
}

lazy_static! {
    // Process-wide language preference store, keyed by telegram user id.
    // Guarded by a single lock; misses fall through to the customers table.
    static ref LANGUAGE_PREFERENCES: Mutex<MemoryCache<i64, String>> =
        Mutex::new(MemoryCache::new());
}

/// Look up a cached language preference for a telegram user
pub fn cached_user_language(telegram_id: i64) -> Option<String> {
    LANGUAGE_PREFERENCES.lock().get(&telegram_id)
}

/// Cache a language preference for a telegram user
pub fn cache_user_language(telegram_id: i64, language: String, ttl: Duration) {
    LANGUAGE_PREFERENCES.lock().insert(telegram_id, language, ttl);
}

/// Drop a cached language preference, forcing the next lookup to hit the database
pub fn invalidate_user_language(telegram_id: i64) {
    LANGUAGE_PREFERENCES.lock().remove(&telegram_id);
}

/// Statistics for the language preference cache
pub fn language_cache_stats() -> CacheStats {
    LANGUAGE_PREFERENCES.lock().stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_memory_cache_basic_operations() {
        let mut cache = MemoryCache::new();

        // Test insert and get
        cache.insert("key1", "value1", Duration::from_secs(60));
        assert_eq!(cache.get(&"key1"), Some("value1"));
        assert_eq!(cache.get(&"key2"), None);

        // Test stats
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_memory_cache_expiration() {
        let mut cache = MemoryCache::new();

        // Insert with very short TTL
        cache.insert("key1", "value1", Duration::from_millis(10));

        // Should work immediately
        assert_eq!(cache.get(&"key1"), Some("value1"));

        // Wait for expiration
        thread::sleep(Duration::from_millis(20));

        // Should be expired
        assert_eq!(cache.get(&"key1"), None);
    }

    #[test]
    fn test_memory_cache_cleanup() {
        let mut cache = MemoryCache::new();

        // Insert multiple entries with different TTLs
        cache.insert("key1", "value1", Duration::from_millis(10));
        cache.insert("key2", "value2", Duration::from_secs(60));

        // Wait for first entry to expire
        thread::sleep(Duration::from_millis(20));

        // Cleanup should remove expired entries
        cache.cleanup();

        assert_eq!(cache.get(&"key1"), None);
        assert_eq!(cache.get(&"key2"), Some("value2"));
    }

    #[test]
    fn test_memory_cache_remove_and_clear() {
        let mut cache = MemoryCache::new();

        cache.insert(1i64, "en".to_string(), Duration::from_secs(60));
        cache.insert(2i64, "he".to_string(), Duration::from_secs(60));

        assert_eq!(cache.remove(&1i64), Some("en".to_string()));
        assert_eq!(cache.remove(&1i64), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_language_preference_singleton() {
        // Keys chosen to avoid collisions with other tests sharing the singleton
        cache_user_language(910_001, "he".to_string(), Duration::from_secs(60));
        assert_eq!(cached_user_language(910_001), Some("he".to_string()));

        invalidate_user_language(910_001);
        assert_eq!(cached_user_language(910_001), None);
    }

    #[test]
    fn test_language_preference_expiry() {
        cache_user_language(910_002, "en".to_string(), Duration::from_millis(10));
        assert_eq!(cached_user_language(910_002), Some("en".to_string()));

        thread::sleep(Duration::from_millis(20));
        assert_eq!(cached_user_language(910_002), None);
    }

    #[test]
    fn test_cache_manager_stats() {
        let manager = CacheManager::with_config(
            Duration::from_secs(300),
            Duration::from_secs(600),
        );

        let stats = manager.stats();
        assert_eq!(stats.customer_cache.entries, 0);
        assert_eq!(stats.product_cache.entries, 0);
    }
}
