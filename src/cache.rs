use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::db::StatusCounts;
use crate::error::Result;
use crate::store::StatsInvalidator;

struct Entry {
    counts: StatusCounts,
    stored_at: Instant,
}

#[derive(Default)]
struct Slots {
    entries: HashMap<Option<Uuid>, Entry>,
    /// Bumped on every invalidation; a load started under an older
    /// generation must not be stored.
    generation: u64,
}

/// TTL cache for status-count aggregates, keyed by journal (`None` is the
/// whole dashboard).
pub struct StatsCache {
    ttl: Duration,
    slots: RwLock<Slots>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: RwLock::new(Slots::default()),
        }
    }

    pub fn get(&self, key: Option<Uuid>) -> Option<StatusCounts> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .entries
            .get(&key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.counts.clone())
    }

    fn generation(&self) -> u64 {
        self.slots.read().unwrap_or_else(|e| e.into_inner()).generation
    }

    #[cfg(test)]
    pub fn put(&self, key: Option<Uuid>, counts: StatusCounts) {
        let generation = self.generation();
        self.put_if_current(key, counts, generation);
    }

    /// Stores `counts` only if no invalidation happened since `generation`
    /// was read.
    fn put_if_current(&self, key: Option<Uuid>, counts: StatusCounts, generation: u64) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if slots.generation != generation {
            return false;
        }
        let ttl = self.ttl;
        slots.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        slots.entries.insert(
            key,
            Entry {
                counts,
                stored_at: Instant::now(),
            },
        );
        true
    }

    pub async fn get_or_load<F, Fut>(&self, key: Option<Uuid>, load: F) -> Result<StatusCounts>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<StatusCounts>>,
    {
        if let Some(counts) = self.get(key) {
            return Ok(counts);
        }
        let generation = self.generation();
        let counts = load().await?;
        if !self.put_if_current(key, counts.clone(), generation) {
            tracing::debug!("Stats invalidated during load; not caching");
        }
        Ok(counts)
    }
}

impl StatsInvalidator for StatsCache {
    fn invalidate_aggregate_stats(&self) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        let dropped = slots.entries.len();
        slots.entries.clear();
        slots.generation += 1;
        tracing::debug!("Invalidated {} cached stats entries", dropped);
    }
}
