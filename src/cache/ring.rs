//! Write Ring Module
//!
//! Records the order in which keys were set, for least-recently-set eviction.

// == Write Ring ==
/// Fixed-length circular record of write history.
///
/// Slot `i` holds the key of the i-th (mod capacity) write. The ring is not
/// a membership list: a slot may still name a key that was deleted or
/// expired since. Such stale slots are harmless because evicting an absent
/// key is a no-op.
#[derive(Debug)]
pub struct WriteRing<K> {
    /// One slot per write, reused every `capacity` writes
    slots: Vec<Option<K>>,
    /// Slot that receives the next write
    cursor: usize,
}

impl<K> WriteRing<K> {
    // == Constructor ==
    /// Creates an empty ring. `capacity` must be positive.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "write ring needs at least one slot");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, cursor: 0 }
    }

    // == Record ==
    /// Writes `key` into the slot at the cursor and advances the cursor.
    ///
    /// Returns the key previously held by that slot, which is the key written
    /// `capacity` writes ago and is due for capacity eviction.
    pub fn record(&mut self, key: K) -> Option<K> {
        let displaced = self.slots[self.cursor].replace(key);
        self.cursor = (self.cursor + 1) % self.slots.len();
        displaced
    }

    // == Reset ==
    /// Discards all history and reallocates the ring with a new capacity.
    pub fn reset(&mut self, capacity: usize) {
        *self = Self::new(capacity);
    }

    /// Index of the slot the next write will use.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    // == Peek Next ==
    /// Returns the key the next write will displace without modifying the ring.
    #[cfg(test)]
    pub fn peek_next(&self) -> Option<&K> {
        self.slots[self.cursor].as_ref()
    }
}
