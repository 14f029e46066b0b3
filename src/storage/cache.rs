use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};

use tracing::debug;

/// Time-boxed read cache with one explicit invalidation hook.
///
/// Every write path of the store calls [`ReadCache::invalidate`] before it
/// reports success, so the next read observes the write.
pub struct ReadCache<T> {
    ttl: Duration,
    entry: Mutex<Option<(Instant, Arc<T>)>>,
    invalidations: AtomicU64,
}

impl<T> ReadCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
            invalidations: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value while it is fresh, otherwise loads, stores
    /// and returns a new one. Load failures leave the cache empty.
    pub fn get_or_load<E, F>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut entry = self.lock();
        if let Some((loaded_at, value)) = entry.as_ref() {
            if loaded_at.elapsed() < self.ttl {
                debug!("ledger read served from cache");
                return Ok(Arc::clone(value));
            }
        }
        debug!("ledger read cache miss");
        let value = Arc::new(load()?);
        *entry = Some((Instant::now(), Arc::clone(&value)));
        Ok(value)
    }

    pub fn invalidate(&self) {
        self.lock().take();
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of times the cache has been invalidated.
    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn is_warm(&self) -> bool {
        self.lock()
            .as_ref()
            .map(|(loaded_at, _)| loaded_at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, Option<(Instant, Arc<T>)>> {
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_read_within_ttl_does_not_reload() {
        let cache = ReadCache::new(Duration::from_secs(60));
        let mut loads = 0;
        let first = cache
            .get_or_load(|| -> Result<_, ()> {
                loads += 1;
                Ok(vec![1, 2, 3])
            })
            .unwrap();
        let second = cache
            .get_or_load(|| -> Result<_, ()> {
                loads += 1;
                Ok(vec![9])
            })
            .unwrap();
        assert_eq!(loads, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidate_forces_reload() {
        let cache = ReadCache::new(Duration::from_secs(60));
        cache.get_or_load(|| -> Result<_, ()> { Ok(1) }).unwrap();
        cache.invalidate();
        assert!(!cache.is_warm());
        let value = cache.get_or_load(|| -> Result<_, ()> { Ok(2) }).unwrap();
        assert_eq!(*value, 2);
        assert_eq!(cache.invalidations(), 1);
    }

    #[test]
    fn zero_ttl_never_serves_stale_values() {
        let cache = ReadCache::new(Duration::ZERO);
        cache.get_or_load(|| -> Result<_, ()> { Ok(1) }).unwrap();
        let value = cache.get_or_load(|| -> Result<_, ()> { Ok(2) }).unwrap();
        assert_eq!(*value, 2);
    }

    #[test]
    fn failed_load_leaves_cache_cold() {
        let cache: ReadCache<u8> = ReadCache::new(Duration::from_secs(60));
        assert!(cache.get_or_load(|| Err("down")).is_err());
        assert!(!cache.is_warm());
    }
}
