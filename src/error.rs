use thiserror::Error;

/// Describes a broken internal invariant found by
/// [`LruCache::check_invariants`](crate::LruCache::check_invariants) or
/// [`RecencyList::validate`](crate::RecencyList::validate).
///
/// These never occur through the public API; they exist so tests and
/// debug assertions can say *which* invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("index holds {map} entries but recency list holds {list}")]
    LengthMismatch { map: usize, list: usize },

    #[error("cache holds {len} entries, above its capacity of {capacity}")]
    OverCapacity { len: usize, capacity: usize },

    #[error("entry handle {0} does not name a list node holding its key")]
    DanglingHandle(usize),

    #[error("recency list links are inconsistent at node {0}")]
    BrokenLink(usize),

    #[error("recency list walk visited {walked} nodes but the list reports {len}")]
    WalkMismatch { walked: usize, len: usize },
}
