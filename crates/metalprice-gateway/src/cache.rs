//! Price cache: one slot per base currency.
//!
//! Each slot is an async mutex. The price service holds it across the
//! freshness check, the upstream fetch, and the write-back, so at most one
//! fetch per base is in flight and concurrent callers during a miss wait for
//! that fetch instead of issuing their own.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

use metalprice_core::PriceSnapshot;

/// Last successful result for one base. Replaced wholesale, never patched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: PriceSnapshot,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn new(snapshot: PriceSnapshot, fetched_at: Instant) -> Self {
        Self { snapshot, fetched_at }
    }

    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        is_fresh(self.fetched_at, now, ttl)
    }
}

/// `now - fetched_at < ttl`. An entry exactly `ttl` old is stale.
pub fn is_fresh(fetched_at: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(fetched_at) < ttl
}

pub type Slot = Arc<Mutex<Option<CacheEntry>>>;

#[derive(Default)]
pub struct PriceCache {
    slots: DashMap<String, Slot>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, base: &str) -> Slot {
        self.slots
            .entry(base.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .value()
            .clone()
    }

    /// Exclusive access to a base's slot. Holding the guard blocks every
    /// other caller for the same base.
    pub async fn lock(&self, base: &str) -> OwnedMutexGuard<Option<CacheEntry>> {
        self.slot(base).lock_owned().await
    }

    pub async fn get(&self, base: &str) -> Option<CacheEntry> {
        self.slot(base).lock().await.clone()
    }

    pub async fn put(&self, base: &str, entry: CacheEntry) {
        *self.slot(base).lock().await = Some(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(base: &str) -> PriceSnapshot {
        PriceSnapshot::new(base, 1_700_000_000, &Default::default())
    }

    #[test]
    fn freshness_boundary_is_exclusive() {
        let t0 = Instant::now();
        let ttl = Duration::from_secs(60);
        assert!(is_fresh(t0, t0, ttl));
        assert!(is_fresh(t0, t0 + ttl - Duration::from_millis(1), ttl));
        assert!(!is_fresh(t0, t0 + ttl, ttl));
        assert!(!is_fresh(t0, t0 + ttl + Duration::from_secs(1), ttl));
    }

    #[tokio::test]
    async fn slots_are_per_base() {
        let cache = PriceCache::new();
        assert!(cache.get("USD").await.is_none());

        cache.put("USD", CacheEntry::new(snapshot("USD"), Instant::now())).await;
        assert_eq!(cache.get("USD").await.unwrap().snapshot.base, "USD");
        assert!(cache.get("EUR").await.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_wholesale() {
        let cache = PriceCache::new();
        let first = Instant::now();
        cache.put("USD", CacheEntry::new(snapshot("USD"), first)).await;
        let later = first + Duration::from_secs(5);
        cache.put("USD", CacheEntry::new(snapshot("USD"), later)).await;
        assert_eq!(cache.get("USD").await.unwrap().fetched_at, later);
    }
}
