use std::{
    collections::{HashSet, VecDeque},
    sync::Mutex,
};

pub const DEFAULT_DEDUP_CAPACITY: usize = 1000;

/// Membership store backing webhook deduplication.
///
/// The trait is the seam for multi-instance deployments: the in-memory cache
/// below is per-process, so a deployment running several instances would swap
/// in a shared store (e.g. a key-value store with TTL) without touching the
/// ingestor.
pub trait DedupStore: Send + Sync {
    /// Atomic check-and-insert. Returns true exactly once per id: on the
    /// first sighting the id is recorded and true comes back, every later
    /// call returns false. Concurrent calls with the same id must not both
    /// observe true.
    fn first_sighting(&self, id: &str) -> bool;

    /// Read-only membership probe.
    fn seen(&self, id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded in-memory set with insertion-order eviction.
///
/// When the cache is full, recording a new id evicts the oldest-inserted
/// entry (not least-recently-used; probes never reorder entries).
pub struct BoundedDedupCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    members: HashSet<String>,
    order: VecDeque<String>,
}

impl BoundedDedupCache {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "dedup cache capacity must be non-zero");
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for BoundedDedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}

impl DedupStore for BoundedDedupCache {
    fn first_sighting(&self, id: &str) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        if inner.members.contains(id) {
            return false;
        }
        if inner.order.len() == self.capacity
            && let Some(oldest) = inner.order.pop_front()
        {
            inner.members.remove(&oldest);
        }
        inner.members.insert(id.to_string());
        inner.order.push_back(id.to_string());
        true
    }

    fn seen(&self, id: &str) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        inner.members.contains(id)
    }

    fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        inner.order.len()
    }
}
