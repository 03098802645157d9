//! Cache module for month-sized meal snapshots
//!
//! This module provides an in-memory cache manager keyed by calendar month,
//! with a configurable TTL (time-to-live). Nothing is persisted: the cache is
//! rebuilt from the meal source whenever a new session starts.

mod manager;

pub use manager::{CacheManager, CachedData};
