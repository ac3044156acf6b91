//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with least-recently-set
//! eviction and per-entry TTL expiry.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::cache::WriteRing;
use crate::config::{validate_max_size, CacheConfig};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_expiry, ExpiryTimer};

// == Cache State ==
/// The three pieces of state that must change together on every write.
struct CacheState<K, V> {
    /// Key-value storage, the only source of truth for membership
    entries: HashMap<K, V>,
    /// Write history driving capacity eviction
    ring: WriteRing<K>,
    /// At most one pending expiry per key
    timers: HashMap<K, ExpiryTimer>,
    /// TTL applied by `set`, read at call time
    default_ttl: Duration,
    next_timer_id: u64,
}

impl<K: Eq + Hash, V> CacheState<K, V> {
    fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ring: WriteRing::new(max_size),
            timers: HashMap::new(),
            default_ttl,
            next_timer_id: 0,
        }
    }

    /// Cancels any pending expiry for `key`, then removes its entry.
    ///
    /// Shared by explicit delete, capacity eviction and TTL expiry.
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(timer) = self.timers.remove(key) {
            timer.cancel();
        }
        self.entries.remove(key).is_some()
    }

    /// Removes `key` on behalf of the timer `timer_id`.
    ///
    /// No-op unless that timer is still the one registered for the key: a
    /// timer that woke up just as the key was re-set or deleted must not
    /// touch the newer entry.
    fn expire(&mut self, key: &K, timer_id: u64) -> bool {
        let current = self.timers.get(key).map(ExpiryTimer::id);
        if current != Some(timer_id) {
            return false;
        }
        trace!("TTL expiry fired for timer {}", timer_id);
        self.remove(key)
    }

    fn reset(&mut self, max_size: usize) {
        for (_, timer) in self.timers.drain() {
            timer.cancel();
        }
        self.entries.clear();
        self.ring.reset(max_size);
    }
}

// == Bounded Expiring Cache ==
/// In-memory cache bounded by write order, with optional per-entry TTL.
///
/// Capacity eviction is driven by a ring of the last `max_size` writes:
/// every `set` evicts whatever key was written `max_size` writes earlier,
/// whether or not the cache is full and whether or not that key was set
/// again since. This is least-recently-*set*, not least-recently-used;
/// reads never change eviction order.
///
/// Each entry set with a positive TTL gets one tokio timer task. Re-setting,
/// deleting, evicting or clearing a key cancels its timer. Dropping the last
/// handle cancels every pending timer.
///
/// The handle is cheap to clone; clones share the same cache. Every
/// operation locks once and runs to completion without awaiting.
pub struct BoundedExpiringCache<K, V> {
    inner: Arc<Mutex<CacheState<K, V>>>,
    /// Runtime the expiry timers are spawned on
    runtime: Handle,
}

impl<K, V> BoundedExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Constructor ==
    /// Creates a cache with `max_size` ring slots and the given default TTL.
    ///
    /// Must be called from within a tokio runtime, which will drive the
    /// expiry timers.
    ///
    /// # Errors
    /// - `InvalidConfig` if `max_size` is zero
    /// - `NoRuntime` if there is no current tokio runtime
    pub fn new(max_size: usize, default_ttl: Duration) -> Result<Self> {
        let config = CacheConfig::default()
            .with_max_size(max_size)
            .with_default_ttl(default_ttl);
        Self::from_config(&config)
    }

    /// Creates a cache from a `CacheConfig` on the current tokio runtime.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Ok(Self::build(config, runtime))
    }

    /// Creates a cache whose expiry timers run on `runtime`.
    ///
    /// Lets the cache be used from threads outside the runtime.
    pub fn with_runtime(config: &CacheConfig, runtime: Handle) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, runtime))
    }

    fn build(config: &CacheConfig, runtime: Handle) -> Self {
        debug!(
            "Cache created: max_size={}, default_ttl={:?}",
            config.max_size, config.default_ttl
        );
        Self {
            inner: Arc::new(Mutex::new(CacheState::new(
                config.max_size,
                config.default_ttl,
            ))),
            runtime,
        }
    }

    // == Set ==
    /// Stores a key-value pair using the current default TTL.
    pub fn set(&self, key: K, value: V) {
        let mut state = self.inner.lock();
        let ttl = state.default_ttl;
        self.write(&mut state, key, value, ttl);
    }

    /// Stores a key-value pair that expires after `ttl`.
    ///
    /// A zero `ttl` means the entry never expires on its own, regardless of
    /// the default TTL. So does a `ttl` too large to add to the current time,
    /// such as `Duration::MAX`.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut state = self.inner.lock();
        self.write(&mut state, key, value, ttl);
    }

    fn write(&self, state: &mut CacheState<K, V>, key: K, value: V, ttl: Duration) {
        // Evict whatever was written into this slot max_size writes ago,
        // regardless of current size. Stale slots make this a no-op.
        let slot = state.ring.cursor();
        if let Some(oldest) = state.ring.record(key.clone()) {
            if state.remove(&oldest) {
                trace!("Capacity eviction at slot {}", slot);
            }
        }

        if let Some(timer) = state.timers.remove(&key) {
            timer.cancel();
        }
        state.entries.insert(key.clone(), value);

        if ttl.is_zero() {
            return;
        }

        let timer_id = state.next_timer_id;
        state.next_timer_id += 1;

        let cache = Arc::downgrade(&self.inner);
        let expiring = key.clone();
        let timer = spawn_expiry(&self.runtime, timer_id, ttl, move || {
            expire_entry(&cache, &expiring, timer_id);
        });
        // A TTL too large for the clock never fires; the entry just persists
        if let Some(timer) = timer {
            state.timers.insert(key, timer);
        }
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Does not affect eviction order or pending expiry.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Returns true if `key` currently has an entry.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().entries.contains_key(key)
    }

    // == Get Or Insert ==
    /// Returns the value under `key`, computing and storing it on a miss.
    ///
    /// `init` runs without the cache locked, so it may use the cache itself.
    /// The store is a regular `set` with the default TTL.
    pub fn get_or_insert_with<F>(&self, key: K, init: F) -> V
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = init();
        self.set(key, value.clone());
        value
    }

    // == Delete ==
    /// Removes an entry and cancels its pending expiry.
    ///
    /// Returns whether the key was present. The write ring is left alone.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    // == Clear ==
    /// Removes every entry and cancels every pending expiry, keeping the
    /// current capacity.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        let max_size = state.ring.capacity();
        state.reset(max_size);
        debug!("Cache cleared: max_size={}", max_size);
    }

    /// Like [`clear`](Self::clear), but also changes the capacity.
    ///
    /// On error the cache is left untouched.
    pub fn clear_with_capacity(&self, new_max_size: usize) -> Result<()> {
        validate_max_size(new_max_size)?;
        self.inner.lock().reset(new_max_size);
        debug!("Cache cleared and resized: max_size={}", new_max_size);
        Ok(())
    }

    // == TTL Remaining ==
    /// Time left before `key` expires, or None if it has no pending expiry.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().timers.get(key).map(ExpiryTimer::remaining)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Number of slots in the write ring.
    pub fn max_size(&self) -> usize {
        self.inner.lock().ring.capacity()
    }

    pub fn default_ttl(&self) -> Duration {
        self.inner.lock().default_ttl
    }

    /// Changes the TTL used by later `set` calls. Already scheduled expiries
    /// keep their original deadline.
    pub fn set_default_ttl(&self, ttl: Duration) {
        self.inner.lock().default_ttl = ttl;
    }

    /// Number of entries with an expiry still pending.
    pub fn pending_expiries(&self) -> usize {
        self.inner.lock().timers.len()
    }
}

/// Timer callback: removes `key` if the cache still exists and the timer is
/// still current.
fn expire_entry<K, V>(cache: &Weak<Mutex<CacheState<K, V>>>, key: &K, timer_id: u64)
where
    K: Eq + Hash,
{
    if let Some(cache) = cache.upgrade() {
        cache.lock().expire(key, timer_id);
    }
}

impl<K, V> Clone for BoundedExpiringCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            runtime: self.runtime.clone(),
        }
    }
}

impl<K, V> fmt::Debug for BoundedExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("BoundedExpiringCache")
            .field("len", &state.entries.len())
            .field("max_size", &state.ring.capacity())
            .field("next_write_slot", &state.ring.cursor())
            .field("pending_expiries", &state.timers.len())
            .field("default_ttl", &state.default_ttl)
            .finish()
    }
}
