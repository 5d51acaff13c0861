use dashmap::DashMap;
use papersheet::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const DATA_CACHE: &str = "dataCache";

/// Memoizes an expensive lookup under a named cache entry.
#[derive(Default)]
pub struct CacheableService {
    cache: DashMap<&'static str, String>,
    delay: Duration,
    computations: AtomicUsize,
}

impl CacheableService {
    pub fn definition() -> ObjectDefinition<Self> {
        ObjectDefinition::new(|_| Ok(Self::default()))
            .property_or(
                "cache.simulated-delay-ms",
                3000u64,
                |service: &mut CacheableService, ms| service.delay = Duration::from_millis(ms),
            )
            .pre_destroy("evict", |service| {
                tracing::debug!("Evicting {} cache entries", service.cache.len());
                service.cache.clear();
                Ok(())
            })
    }

    pub fn cached_data(&self) -> String {
        self.cache
            .entry(DATA_CACHE)
            .or_insert_with(|| {
                self.computations.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(self.delay);
                "Cached Data".to_string()
            })
            .clone()
    }

    /// How many times the uncached path ran.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }
}
