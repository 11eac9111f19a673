//! Constructor-time configuration for [`LruCache`].
//!
//! ```rust
//! use hooked_lru::LruCacheBuilder;
//!
//! let mut cache = LruCacheBuilder::new(16)
//!     .on_create(|key: &u32| key.to_string())
//!     .on_delete(|value: String| drop(value))
//!     .build();
//!
//! assert_eq!(cache.get_or_create(7).map(|v| v.as_str()), Some("7"));
//! ```

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use crate::lru_cache::{CreateHook, DeleteHook, LruCache};

/// Builder for an [`LruCache`] with hooks and a custom hasher.
///
/// Hooks are boxed as `Send + 'static` closures. This keeps the built cache
/// `Send` whenever its keys, values and hasher are, at the price of rejecting
/// hooks that borrow locals or capture `Rc`/`RefCell`; share state with a
/// hook through `Arc` and a mutex or an atomic instead:
///
/// ```rust
/// use hooked_lru::LruCacheBuilder;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let dropped = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&dropped);
/// let mut cache = LruCacheBuilder::new(1)
///     .on_delete(move |_value: u32| {
///         counter.fetch_add(1, Ordering::Relaxed);
///     })
///     .build();
///
/// cache.insert("a", 1);
/// cache.insert("b", 2);
/// assert_eq!(dropped.load(Ordering::Relaxed), 1);
///
/// // The cache itself can be handed to another thread
/// std::thread::spawn(move || cache.clear()).join().unwrap();
/// assert_eq!(dropped.load(Ordering::Relaxed), 2);
/// ```
pub struct LruCacheBuilder<K, V, S = RandomState> {
    capacity: usize,
    hasher: S,
    on_create: Option<CreateHook<K, V>>,
    on_delete: Option<DeleteHook<V>>,
}

impl<K, V> LruCacheBuilder<K, V, RandomState> {
    /// Starts a builder for a cache of at most `capacity` entries.
    ///
    /// Any capacity is accepted; zero yields a pass-through cache.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            hasher: RandomState::new(),
            on_create: None,
            on_delete: None,
        }
    }
}

impl<K, V, S> LruCacheBuilder<K, V, S> {
    /// Sets the function that produces values for missing keys in
    /// [`LruCache::get_or_create`].
    pub fn on_create<F>(mut self, create: F) -> Self
    where
        F: FnMut(&K) -> V + Send + 'static,
    {
        self.on_create = Some(Box::new(create));
        self
    }

    /// Sets the function that receives every value the cache discards.
    ///
    /// It runs synchronously, after the entry has been unlinked and before
    /// the value is dropped, exactly once per discarded value.
    pub fn on_delete<F>(mut self, delete: F) -> Self
    where
        F: FnMut(V) + Send + 'static,
    {
        self.on_delete = Some(Box::new(delete));
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replaces the hasher used by the key index.
    pub fn hasher<S2>(self, hasher: S2) -> LruCacheBuilder<K, V, S2> {
        LruCacheBuilder {
            capacity: self.capacity,
            hasher,
            on_create: self.on_create,
            on_delete: self.on_delete,
        }
    }

    pub fn build(self) -> LruCache<K, V, S>
    where
        K: Hash + Eq + Clone,
        S: BuildHasher,
    {
        LruCache::from_parts(self.capacity, self.hasher, self.on_create, self.on_delete)
    }
}

impl<K, V, S> fmt::Debug for LruCacheBuilder<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheBuilder")
            .field("capacity", &self.capacity)
            .field("on_create", &self.on_create.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .finish()
    }
}
