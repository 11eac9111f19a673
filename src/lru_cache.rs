use std::borrow::Borrow;
use std::collections::hash_map::{self, HashMap, RandomState};
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};
use std::mem;

use tracing::{debug, trace};

use crate::builder::LruCacheBuilder;
use crate::error::InvariantError;
use crate::recency_list::{Handle, RecencyList};

// Upper bound on what the constructors reserve up front; larger caches grow
// on demand.
const PREALLOC_LIMIT: usize = 1024;

// Hooks are `Send` so that a cache with `Send` keys and values can move
// between threads; hooks capturing `Rc` or `RefCell` are therefore rejected.
pub(crate) type CreateHook<K, V> = Box<dyn FnMut(&K) -> V + Send>;
pub(crate) type DeleteHook<V> = Box<dyn FnMut(V) + Send>;

// Index side of an entry: the value plus the position of its key in the
// recency list.
struct Entry<V> {
    value: V,
    handle: Handle,
}

/// A bounded LRU cache with optional creation and deletion hooks.
///
/// Lookups go through a `HashMap` from key to value and list handle; the
/// recency order lives in an arena-backed [`RecencyList`] whose handles stay
/// valid across unrelated inserts and removals, so every operation is O(1)
/// on average.
///
/// * The creation hook materializes values for [`get_or_create`] misses.
/// * The deletion hook receives every value the cache discards: on
///   overwrite, [`erase`], eviction, [`resize`], [`clear`] and drop.
///
/// A capacity of zero is valid and turns the cache into a pass-through:
/// each new entry goes straight to the deletion hook.
///
/// The cache does no locking. Share it across threads behind a mutex, and
/// store `Arc<V>` when values must outlive their eviction.
///
/// # Examples
///
/// ```rust
/// use hooked_lru::LruCache;
///
/// let mut cache = LruCache::new(2);
/// assert!(cache.insert("a".to_string(), 1));
/// assert!(cache.insert("b".to_string(), 2));
///
/// // "a" becomes the most recently used entry, so "b" is evicted next
/// cache.touch("a");
/// cache.insert("c".to_string(), 3);
/// assert!(cache.contains("a"));
/// assert!(!cache.contains("b"));
/// ```
///
/// [`get_or_create`]: LruCache::get_or_create
/// [`erase`]: LruCache::erase
/// [`resize`]: LruCache::resize
/// [`clear`]: LruCache::clear
pub struct LruCache<K, V, S = RandomState> {
    cap: usize,
    map: HashMap<K, Entry<V>, S>,
    list: RecencyList<K>,
    on_create: Option<CreateHook<K, V>>,
    on_delete: Option<DeleteHook<V>>,
}

impl<K, V> LruCache<K, V, RandomState>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache holding at most `capacity` entries, without hooks.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, RandomState::new())
    }

    /// Starts a [`LruCacheBuilder`] for configuring hooks and the hasher.
    pub fn builder(capacity: usize) -> LruCacheBuilder<K, V> {
        LruCacheBuilder::new(capacity)
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        Self::from_parts(capacity, hasher, None, None)
    }

    pub(crate) fn from_parts(
        capacity: usize,
        hasher: S,
        on_create: Option<CreateHook<K, V>>,
        on_delete: Option<DeleteHook<V>>,
    ) -> Self {
        let reserve = capacity.min(PREALLOC_LIMIT);
        Self {
            cap: capacity,
            map: HashMap::with_capacity_and_hasher(reserve, hasher),
            list: RecencyList::with_capacity(reserve),
            on_create,
            on_delete,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` is cached. Recency is not affected.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Returns a clone of the value for `key` without marking it as used.
    ///
    /// Unlike [`get`](Self::get), this is a pure probe: it never reorders
    /// entries, so reading through `at` does not protect an entry from
    /// eviction.
    pub fn at<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.peek(key).cloned()
    }

    /// Borrows the value for `key` without marking it as used.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|entry| &entry.value)
    }

    /// The entry that would be evicted next.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        let key = self.list.back()?;
        self.map.get(key).map(|entry| (key, &entry.value))
    }

    /// The most recently used entry.
    pub fn peek_newest(&self) -> Option<(&K, &V)> {
        let key = self.list.front()?;
        self.map.get(key).map(|entry| (key, &entry.value))
    }

    /// Retrieves a value and marks the entry as most recently used.
    ///
    /// # Returns
    ///
    /// * `Some(&mut V)` if the key exists
    /// * `None` if the key doesn't exist; nothing is created
    pub fn get<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.map.get_mut(key)?;
        self.list.move_to_front(entry.handle);
        Some(&mut entry.value)
    }

    /// Returns the value for `key`, creating it on a miss.
    ///
    /// A hit marks the entry as most recently used. A miss asks the creation
    /// hook for a value, falling back to `V::default()` when no hook is
    /// configured, and stores it as the newest entry, evicting the oldest
    /// one if the cache is full.
    ///
    /// Returns `None` only for a zero-capacity cache, where the created
    /// value is handed straight to the deletion hook.
    pub fn get_or_create(&mut self, key: K) -> Option<&mut V>
    where
        V: Default,
    {
        self.get_or_create_with(key, V::default)
    }

    /// Like [`get_or_create`](Self::get_or_create), but uses `fallback`
    /// instead of `V::default()` when no creation hook is configured.
    pub fn get_or_create_with<F>(&mut self, key: K, fallback: F) -> Option<&mut V>
    where
        F: FnOnce() -> V,
    {
        if self.map.contains_key(&key) {
            return self.get(&key);
        }
        let value = match self.on_create.as_mut() {
            Some(create) => create(&key),
            None => fallback(),
        };
        self.place(key, value)
    }

    /// Inserts `value` if `key` is not cached yet.
    ///
    /// An existing entry is left untouched: neither its value nor its
    /// position changes. Use [`insert_or_assign`](Self::insert_or_assign)
    /// or [`assign`](Self::assign) to replace values.
    ///
    /// # Returns
    ///
    /// * `true` if the entry was inserted
    /// * `false` if the key was already present
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.map.contains_key(&key) {
            return false;
        }
        self.place(key, value);
        true
    }

    /// Inserts a value built by `make` if `key` is not cached yet.
    ///
    /// `make` only runs when the key is absent. Returns the stored value and
    /// whether an insertion happened; the value is `None` only when a
    /// zero-capacity cache discarded the new entry.
    pub fn emplace<F>(&mut self, key: K, make: F) -> (Option<&mut V>, bool)
    where
        F: FnOnce() -> V,
    {
        if self.map.contains_key(&key) {
            let existing = self.map.get_mut(&key).map(|entry| &mut entry.value);
            return (existing, false);
        }
        let value = make();
        (self.place(key, value), true)
    }

    /// Inserts or replaces the value for `key` and marks it as most recently
    /// used. A replaced value goes through the deletion hook.
    pub fn insert_or_assign(&mut self, key: K, value: V) {
        match self.map.get_mut(&key) {
            Some(entry) => {
                let old = mem::replace(&mut entry.value, value);
                self.list.move_to_front(entry.handle);
                self.discard(old);
            }
            None => {
                self.place(key, value);
            }
        }
    }

    /// Replaces the value of an existing entry and marks it as most recently
    /// used. The old value goes through the deletion hook.
    ///
    /// Returns `false`, leaving the cache unchanged, if `key` is absent.
    pub fn assign<Q>(&mut self, key: &Q, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get_mut(key) {
            Some(entry) => {
                let old = mem::replace(&mut entry.value, value);
                self.list.move_to_front(entry.handle);
                self.discard(old);
                true
            }
            None => false,
        }
    }

    /// Marks an entry as most recently used without reading its value.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get(key) {
            Some(entry) => self.list.move_to_front(entry.handle),
            None => false,
        }
    }

    /// Removes `key`, passing its value to the deletion hook.
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.remove(key) {
            Some(entry) => {
                self.list.remove(entry.handle);
                self.discard(entry.value);
                true
            }
            None => false,
        }
    }

    /// Evicts the least recently used entry through the deletion hook.
    ///
    /// Does nothing and returns `false` on an empty cache.
    pub fn erase_oldest(&mut self) -> bool {
        let Some(key) = self.list.pop_back() else {
            return false;
        };
        match self.map.remove(&key) {
            Some(entry) => {
                trace!(
                    len = self.map.len(),
                    capacity = self.cap,
                    "evicted least recently used entry"
                );
                self.discard(entry.value);
                true
            }
            None => false,
        }
    }

    /// Changes the capacity, evicting the oldest entries until the cache
    /// fits.
    pub fn resize(&mut self, capacity: usize) {
        let old = self.cap;
        self.cap = capacity;
        if self.map.len() > capacity {
            debug!(
                from = old,
                to = capacity,
                evicting = self.map.len() - capacity,
                "shrinking lru cache"
            );
            while self.map.len() > self.cap && self.erase_oldest() {}
        }
    }

    /// Evicts every entry, oldest first, through the deletion hook.
    ///
    /// Capacity and hooks are kept.
    pub fn clear(&mut self) {
        debug!(len = self.map.len(), "clearing lru cache");
        while self.erase_oldest() {}
        self.list.clear();
    }

    /// Iterates over entries in hash order. Recency is not affected.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.map.iter(),
        }
    }

    /// Iterates over keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.list.iter()
    }

    /// Verifies the index/recency-list bijection, the capacity bound and
    /// the list links.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.validate()?;
        if self.map.len() != self.list.len() {
            return Err(InvariantError::LengthMismatch {
                map: self.map.len(),
                list: self.list.len(),
            });
        }
        if self.map.len() > self.cap {
            return Err(InvariantError::OverCapacity {
                len: self.map.len(),
                capacity: self.cap,
            });
        }
        for (key, entry) in &self.map {
            if self.list.get(entry.handle) != Some(key) {
                return Err(InvariantError::DanglingHandle(entry.handle.index()));
            }
        }
        Ok(())
    }

    // Stores a value for an absent key as the newest entry
    fn place(&mut self, key: K, value: V) -> Option<&mut V> {
        if self.cap == 0 {
            trace!("zero capacity, discarding new entry");
            self.discard(value);
            return None;
        }
        self.make_space();

        let handle = self.list.push_front(key.clone());
        let entry = self.map.entry(key).or_insert(Entry { value, handle });
        Some(&mut entry.value)
    }

    // Evict from the back until there is room for one more entry
    fn make_space(&mut self) {
        while self.map.len() >= self.cap {
            if !self.erase_oldest() {
                break;
            }
        }
    }

    fn discard(&mut self, value: V) {
        if let Some(on_delete) = self.on_delete.as_mut() {
            on_delete(value);
        }
    }
}

impl<K, V, S> Drop for LruCache<K, V, S> {
    fn drop(&mut self) {
        self.list.clear();
        if let Some(on_delete) = self.on_delete.as_mut() {
            for (_, entry) in self.map.drain() {
                on_delete(entry.value);
            }
        }
    }
}

impl<K, V, S> Debug for LruCache<K, V, S>
where
    K: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.cap)
            .field("len", &self.map.len())
            .field("recency", &self.list.iter().collect::<Vec<_>>())
            .field("on_create", &self.on_create.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .finish()
    }
}

/// Iterator over `(&K, &V)` in hash order, see [`LruCache::iter`].
pub struct Iter<'a, K, V> {
    inner: hash_map::Iter<'a, K, Entry<V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, entry)| (key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    type Log<V> = Arc<Mutex<Vec<V>>>;

    // Cache whose deletion hook records every discarded value
    fn recording_cache(capacity: usize) -> (LruCache<String, String>, Log<String>) {
        let log: Log<String> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let cache = LruCache::builder(capacity)
            .on_delete(move |value: String| sink.lock().push(value))
            .build();
        (cache, log)
    }

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_basic_operations() {
        let mut cache = LruCache::new(2);

        assert!(cache.is_empty());
        assert!(cache.insert(key("key1"), "one".to_string()));
        assert!(cache.insert(key("key2"), "two".to_string()));
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.get("key1").map(|v| v.as_str()), Some("one"));
        assert_eq!(cache.get("key2").map(|v| v.as_str()), Some("two"));

        // Verify capacity limit
        cache.insert(key("key3"), "three".to_string());
        assert!(cache.len() <= cache.capacity());

        // Verify LRU behavior
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.at("key2"), Some("two".to_string()));
        assert_eq!(cache.at("key3"), Some("three".to_string()));
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_insert_keeps_existing_value() {
        let (mut cache, log) = recording_cache(2);

        assert!(cache.insert(key("key1"), "one".to_string()));
        assert!(cache.insert(key("key2"), "two".to_string()));
        assert!(!cache.insert(key("key1"), "new_one".to_string()));

        assert_eq!(cache.at("key1"), Some("one".to_string()));
        // Rejected insert does not promote key1
        assert_eq!(cache.peek_oldest().map(|(k, _)| k.as_str()), Some("key1"));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = LruCache::new(3);
        for i in 1..=4 {
            cache.insert(i, i * 100);
        }

        assert!(!cache.contains(&1));
        for i in 2..=4 {
            assert!(cache.contains(&i));
        }
        assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), vec![4, 3, 2]);
    }

    #[test]
    fn test_touch_reorders() {
        let mut cache = LruCache::new(3);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(3, "c");

        assert!(cache.touch(&1));
        cache.insert(4, "d");

        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(!cache.touch(&2));
    }

    #[test]
    fn test_get_promotes_recency() {
        let mut cache = LruCache::new(3);
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(3, 30);

        assert_eq!(cache.get(&1).copied(), Some(10));
        cache.insert(4, 40);
        cache.insert(5, 50);

        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(!cache.contains(&3));
    }

    #[test]
    fn test_probes_do_not_reorder() {
        let mut cache = LruCache::new(2);
        cache.insert(key("key1"), 1);
        cache.insert(key("key2"), 2);

        assert!(cache.contains("key1"));
        assert_eq!(cache.at("key1"), Some(1));
        assert_eq!(cache.peek("key1"), Some(&1));
        assert_eq!(cache.iter().count(), 2);

        cache.insert(key("key3"), 3);
        assert!(!cache.contains("key1"));
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut cache = LruCache::new(2);
        cache.insert(key("counter"), 1);

        if let Some(value) = cache.get("counter") {
            *value += 41;
        }
        assert_eq!(cache.at("counter"), Some(42));
    }

    #[test]
    fn test_insert_or_assign() {
        let (mut cache, log) = recording_cache(2);

        cache.insert_or_assign(key("key1"), "one".to_string());
        cache.insert_or_assign(key("key2"), "two".to_string());
        cache.insert_or_assign(key("key1"), "new_one".to_string());

        assert_eq!(cache.at("key1"), Some("new_one".to_string()));
        assert_eq!(*log.lock(), vec!["one".to_string()]);

        // key1 was promoted by the overwrite, so key2 goes first
        cache.insert_or_assign(key("key3"), "three".to_string());
        assert!(cache.contains("key1"));
        assert!(!cache.contains("key2"));
        assert_eq!(*log.lock(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_assign() {
        let (mut cache, log) = recording_cache(2);
        cache.insert(key("key1"), "one".to_string());
        cache.insert(key("key2"), "two".to_string());

        assert!(!cache.assign("missing", "x".to_string()));
        assert!(!cache.contains("missing"));

        assert!(cache.assign("key1", "uno".to_string()));
        assert_eq!(cache.peek_newest().map(|(k, _)| k.as_str()), Some("key1"));
        assert_eq!(cache.at("key1"), Some("uno".to_string()));
        assert_eq!(*log.lock(), vec!["one".to_string()]);
    }

    #[test]
    fn test_emplace() {
        let mut cache = LruCache::new(2);
        let (value, inserted) = cache.emplace(key("key1"), || vec![1, 2, 3]);
        assert!(inserted);
        assert_eq!(value.map(|v| v.len()), Some(3));

        let mut called = false;
        let (value, inserted) = cache.emplace(key("key1"), || {
            called = true;
            Vec::new()
        });
        assert!(!inserted);
        assert_eq!(value.map(|v| v.clone()), Some(vec![1, 2, 3]));
        assert!(!called);
    }

    #[test]
    fn test_emplace_evicts_oldest_when_full() {
        let (mut cache, log) = recording_cache(2);
        cache.insert(key("key1"), "one".to_string());
        cache.insert(key("key2"), "two".to_string());

        let (value, inserted) = cache.emplace(key("key3"), || "three".to_string());
        assert!(inserted);
        assert_eq!(value.map(|v| v.as_str()), Some("three"));

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("key1"));
        assert_eq!(*log.lock(), vec!["one".to_string()]);
        assert_eq!(cache.peek_newest().map(|(k, _)| k.as_str()), Some("key3"));
        assert_eq!(cache.peek_oldest().map(|(k, _)| k.as_str()), Some("key2"));
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_peek_ends() {
        let mut cache = LruCache::new(3);
        assert_eq!(cache.peek_oldest(), None);
        assert_eq!(cache.peek_newest(), None);

        cache.insert(1, "a");
        assert_eq!(cache.peek_oldest(), Some((&1, &"a")));
        assert_eq!(cache.peek_newest(), Some((&1, &"a")));

        cache.insert(2, "b");
        cache.insert(3, "c");
        cache.touch(&1);
        assert_eq!(cache.peek_oldest(), Some((&2, &"b")));
        assert_eq!(cache.peek_newest(), Some((&1, &"a")));

        // Peeking does not change which entry is evicted next
        cache.insert(4, "d");
        assert!(!cache.contains(&2));

        cache.clear();
        assert_eq!(cache.peek_oldest(), None);
        assert_eq!(cache.peek_newest(), None);
    }

    #[test]
    fn test_get_or_create_uses_hook() {
        let created: Log<u32> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&created);
        let mut cache = LruCache::builder(2)
            .on_create(move |key: &u32| {
                sink.lock().push(*key);
                format!("value_{}", key)
            })
            .build();

        assert_eq!(cache.get_or_create(1).cloned(), Some("value_1".to_string()));
        assert_eq!(cache.get_or_create(1).cloned(), Some("value_1".to_string()));
        assert_eq!(*created.lock(), vec![1]);

        cache.get_or_create(2);
        cache.get_or_create(1);
        cache.get_or_create(3);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert_eq!(*created.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_get_or_create_without_hook() {
        let mut cache: LruCache<String, u64> = LruCache::new(2);
        if let Some(hits) = cache.get_or_create(key("page")) {
            *hits += 1;
        }
        if let Some(hits) = cache.get_or_create(key("page")) {
            *hits += 1;
        }
        assert_eq!(cache.at("page"), Some(2));

        let value = cache.get_or_create_with(key("other"), || 7);
        assert_eq!(value.copied(), Some(7));
    }

    #[test]
    fn test_erase() {
        let (mut cache, log) = recording_cache(3);
        cache.insert(key("key1"), "one".to_string());
        cache.insert(key("key2"), "two".to_string());

        assert!(cache.erase("key1"));
        assert!(!cache.erase("key1"));
        assert_eq!(cache.len(), 1);
        assert_eq!(*log.lock(), vec!["one".to_string()]);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_erase_oldest() {
        let (mut cache, log) = recording_cache(3);
        assert!(!cache.erase_oldest());

        cache.insert(key("key1"), "one".to_string());
        cache.insert(key("key2"), "two".to_string());
        assert!(cache.erase_oldest());
        assert_eq!(*log.lock(), vec!["one".to_string()]);
        assert!(cache.erase_oldest());
        assert!(!cache.erase_oldest());
        assert!(cache.is_empty());
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_resize() {
        let (mut cache, log) = recording_cache(4);
        for name in ["a", "b", "c", "d"] {
            cache.insert(key(name), name.to_uppercase());
        }
        cache.touch("a");

        cache.resize(2);
        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(*log.lock(), vec!["B".to_string(), "C".to_string()]);
        assert!(cache.contains("a"));
        assert!(cache.contains("d"));

        cache.resize(5);
        assert_eq!(cache.len(), 2);
        for name in ["e", "f", "g"] {
            cache.insert(key(name), name.to_uppercase());
        }
        assert_eq!(cache.len(), 5);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_clear_keeps_configuration() {
        let (mut cache, log) = recording_cache(3);
        cache.insert(key("key1"), "one".to_string());
        cache.insert(key("key2"), "two".to_string());

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.capacity(), 3);
        assert_eq!(*log.lock(), vec!["one".to_string(), "two".to_string()]);

        // Hook is still installed
        cache.insert(key("key3"), "three".to_string());
        cache.erase("key3");
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_zero_capacity_passes_through() {
        let (mut cache, log) = recording_cache(0);

        assert!(cache.insert(key("key1"), "one".to_string()));
        assert!(cache.is_empty());
        assert!(!cache.contains("key1"));
        assert_eq!(*log.lock(), vec!["one".to_string()]);

        assert_eq!(cache.get_or_create(key("key2")), None);
        let (value, inserted) = cache.emplace(key("key3"), || "three".to_string());
        assert!(value.is_none());
        assert!(inserted);
        cache.insert_or_assign(key("key4"), "four".to_string());

        assert_eq!(log.lock().len(), 4);
        assert!(!cache.erase_oldest());
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_drop_runs_delete_hook() {
        let (mut cache, log) = recording_cache(3);
        cache.insert(key("key1"), "one".to_string());
        cache.insert(key("key2"), "two".to_string());
        drop(cache);

        let mut dropped = log.lock().clone();
        dropped.sort();
        assert_eq!(dropped, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_delete_hook_fires_once_per_value() {
        let (mut cache, log) = recording_cache(2);
        cache.insert(key("key1"), "one".to_string());
        cache.insert(key("key2"), "two".to_string());
        cache.insert(key("key3"), "three".to_string());
        assert_eq!(*log.lock(), vec!["one".to_string()]);

        assert!(cache.erase("key2"));
        assert!(cache.erase("key3"));
        assert_eq!(log.lock().len(), 3);

        drop(cache);
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_values_can_outlive_eviction() {
        let mut cache = LruCache::new(1);
        cache.insert(1, Arc::new("shared".to_string()));
        let held = cache.get(&1).map(|v| Arc::clone(v));

        cache.insert(2, Arc::new("other".to_string()));
        assert!(!cache.contains(&1));
        assert_eq!(held.as_deref().map(|s| s.as_str()), Some("shared"));
    }

    #[test]
    fn test_panicking_delete_hook_keeps_structure_consistent() {
        let mut cache = LruCache::builder(2)
            .on_delete(|value: u32| {
                if value == 13 {
                    panic!("refusing to drop {}", value);
                }
            })
            .build();
        cache.insert(1, 13);
        cache.insert(2, 20);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            cache.insert(3, 30);
        }));
        assert!(result.is_err());
        assert!(!cache.contains(&1));
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_iter_and_debug() {
        let mut cache = LruCache::new(3);
        cache.insert(1, "a");
        cache.insert(2, "b");

        let mut pairs: Vec<_> = (&cache).into_iter().map(|(k, v)| (*k, *v)).collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, "a"), (2, "b")]);

        let rendered = format!("{:?}", cache);
        assert!(rendered.contains("capacity: 3"));
        assert!(rendered.contains("recency: [2, 1]"));
    }
}
