//! Cache manager for month-sized meal snapshots
//!
//! Provides a `CacheManager` that keeps fetched menus in memory with expiry
//! timestamps. Entries live as long as the session that owns the manager.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::data::{MealMenus, MonthKey};

/// A cached month snapshot with its lifetime
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached menus
    data: MealMenus,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug, Clone)]
pub struct CachedData {
    /// The cached menus
    pub data: MealMenus,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// Whether the cache entry has expired
    pub is_expired: bool,
}

/// Manages month snapshots of meal data
///
/// An entry is valid while the current time is before `cached_at + ttl`.
/// Only valid entries are handed out.
#[derive(Debug, Clone)]
pub struct CacheManager {
    entries: HashMap<MonthKey, CacheEntry>,
    ttl: Duration,
}

impl CacheManager {
    /// Creates an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Stores a month snapshot taken at `now`, replacing any previous entry
    pub fn write(&mut self, key: MonthKey, data: MealMenus, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            CacheEntry {
                data,
                cached_at: now,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Reads a month snapshot as seen at `now`
    ///
    /// Returns `None` if nothing was cached for the month.
    fn read(&self, key: MonthKey, now: DateTime<Utc>) -> Option<CachedData> {
        let entry = self.entries.get(&key)?;
        Some(CachedData {
            data: entry.data.clone(),
            cached_at: entry.cached_at,
            is_expired: now >= entry.expires_at,
        })
    }

    /// Reads a month snapshot only if it has not expired at `now`
    pub fn read_fresh(&self, key: MonthKey, now: DateTime<Utc>) -> Option<CachedData> {
        self.read(key, now).filter(|cached| !cached.is_expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn month(y: i32, m: u32) -> MonthKey {
        MonthKey::containing(NaiveDate::from_ymd_opt(y, m, 1).unwrap())
    }

    fn menus(item: &str) -> MealMenus {
        let mut data = MealMenus::new();
        data.insert(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            vec![item.to_string()],
        );
        data
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let cache = CacheManager::new(Duration::hours(24));
        assert!(cache.read(month(2024, 3), Utc::now()).is_none());
    }

    #[test]
    fn test_read_returns_fresh_entry() {
        let mut cache = CacheManager::new(Duration::hours(24));
        let now = Utc::now();
        cache.write(month(2024, 3), menus("쌀밥"), now);

        let cached = cache.read(month(2024, 3), now + Duration::hours(1)).unwrap();
        assert_eq!(cached.data, menus("쌀밥"));
        assert_eq!(cached.cached_at, now);
        assert!(!cached.is_expired);
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let mut cache = CacheManager::new(Duration::hours(24));
        let now = Utc::now();
        cache.write(month(2024, 3), menus("쌀밥"), now);

        let cached = cache.read(month(2024, 3), now + Duration::hours(24)).unwrap();
        assert!(cached.is_expired, "entry is invalid once now reaches expires_at");
        assert!(cache
            .read_fresh(month(2024, 3), now + Duration::hours(24))
            .is_none());
    }

    #[test]
    fn test_overwrite_existing_entry() {
        let mut cache = CacheManager::new(Duration::hours(24));
        let now = Utc::now();
        cache.write(month(2024, 3), menus("first"), now);
        cache.write(month(2024, 3), menus("second"), now);

        assert_eq!(cache.entries.len(), 1);
        assert_eq!(cache.read(month(2024, 3), now).unwrap().data, menus("second"));
    }

    #[test]
    fn test_months_are_independent() {
        let mut cache = CacheManager::new(Duration::hours(24));
        let now = Utc::now();
        cache.write(month(2024, 3), menus("march"), now);

        assert!(cache.read_fresh(month(2024, 4), now).is_none());
        assert!(cache.read_fresh(month(2024, 3), now).is_some());
    }
}
