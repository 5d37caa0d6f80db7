use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source for cache expiry. Injected so TTL behavior is testable and
/// so business logic never reads the wall clock directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Public so embedders and
/// integration tests can drive expiry deterministically.
pub struct ManualClock {
    base: Instant,
    offset: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            base: Instant::now(),
            offset: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset.load(Ordering::SeqCst))
    }
}

/// Process-local TTL cache.
///
/// Entries expire `ttl` after insertion and are purged lazily on read.
/// Mutating callers must invalidate explicitly (per key or globally);
/// in multi-instance deployments other processes keep serving the stale
/// value until their TTL elapses — an accepted trade-off, bounded by `ttl`.
pub struct TtlCache<V: Clone> {
    entries: DashMap<String, (Instant, V)>,
    ttl: Duration,
    cap: usize,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, cap: usize, clock: Arc<dyn Clock>) -> Self {
        TtlCache {
            entries: DashMap::new(),
            ttl,
            cap,
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if now.duration_since(entry.0) < self.ttl {
                    return Some(entry.1.clone());
                }
                true
            }
            None => false,
        };
        // The read guard must be released before removing from the shard.
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: String, value: V) {
        if self.entries.len() >= self.cap {
            let now = self.clock.now();
            let ttl = self.ttl;
            self.entries
                .retain(|_, (inserted, _)| now.duration_since(*inserted) < ttl);
            if self.entries.len() >= self.cap {
                self.entries.clear();
            }
        }
        self.entries.insert(key, (self.clock.now(), value));
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
