//! TTL + capacity bounded in-memory cache for external feed responses

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Cache key for location-scoped feed queries. Coordinates are rounded to
/// two decimals so nearby requests share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoKey {
    lat_centi: i32,
    lon_centi: i32,
    radius_km: u32,
}

impl GeoKey {
    pub fn new(latitude: f64, longitude: f64, radius_km: u32) -> Self {
        Self {
            lat_centi: (latitude * 100.0).round() as i32,
            lon_centi: (longitude * 100.0).round() as i32,
            radius_km,
        }
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Expiry is lazy (checked on read); when full, expired entries are purged
/// first and the oldest entry is dropped if the cache is still at capacity.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    ttl: Duration,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
            if entries.len() >= self.capacity {
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(key, Entry { value, inserted_at: Instant::now() });
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_get_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("k", 7u32);
        assert_eq!(cache.get(&"k"), Some(7));
    }

    #[test]
    fn test_expired_entry_is_miss() {
        let cache = TtlCache::new(Duration::from_millis(10), 10);
        cache.insert("k", 7u32);
        sleep(Duration::from_millis(25));
        assert_eq!(cache.get(&"k"), None);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert(1, "a");
        sleep(Duration::from_millis(5));
        cache.insert(2, "b");
        sleep(Duration::from_millis(5));
        cache.insert(3, "c");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("b"));
        assert_eq!(cache.get(&3), Some("c"));
    }

    #[test]
    fn test_geo_key_rounds_to_two_decimals() {
        assert_eq!(GeoKey::new(37.7749, -122.4194, 500), GeoKey::new(37.7751, -122.4201, 500));
        assert_ne!(GeoKey::new(37.7749, -122.4194, 500), GeoKey::new(37.7749, -122.4194, 250));
        assert_ne!(GeoKey::new(37.77, -122.42, 500), GeoKey::new(37.78, -122.42, 500));
    }
}
