//! Time-to-live cache holding one immutable snapshot.
//!
//! Readers clone an `Arc` to the current snapshot and never see a table
//! that is still being built. A refresh builds the complete replacement
//! first and then swaps it in under a short write lock. Refreshes are
//! serialized, so concurrent readers of a stale entry trigger one reload.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use codeward_core::Clock;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

struct Entry<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

/// A single-slot cache with time-based expiry. A zero TTL never expires.
pub struct TtlCache<T> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<Entry<T>>>,
    refresh: Mutex<()>,
    generation: AtomicU64,
}

impl<T> TtlCache<T> {
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached snapshot, loading a new one if missing or expired.
    ///
    /// A failed load leaves the previous snapshot in place.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let _guard = self.refresh.lock().await;
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        debug!(cache = self.name, "Cache empty or stale, reloading");
        let value = Arc::new(load().await?);

        let mut slot = self.slot.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            *slot = Some(Entry {
                value: value.clone(),
                loaded_at: self.clock.now(),
            });
        }
        Ok(value)
    }

    /// Drop the current snapshot. The next read reloads.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.slot.write().await = None;
        debug!(cache = self.name, "Cache invalidated");
    }

    /// Whether a snapshot is currently held, fresh or not.
    pub async fn is_populated(&self) -> bool {
        self.slot.read().await.is_some()
    }

    async fn fresh(&self) -> Option<Arc<T>> {
        let slot = self.slot.read().await;
        let entry = slot.as_ref()?;
        if self.ttl.is_zero() || self.clock.now().duration_since(entry.loaded_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }
}
