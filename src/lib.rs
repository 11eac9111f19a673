//! A bounded LRU (Least Recently Used) cache with creation and deletion hooks.
//!
//! This crate provides:
//!
//! 1. [`LruCache`] - A single-owner LRU cache with O(1) lookup, insert, touch and eviction
//! 2. [`LruCacheBuilder`] - Constructor-time configuration of hooks and hasher
//! 3. [`RecencyList`] - The arena-backed recency list the cache is built on
//!
//! # Features
//!
//! - Insert-if-absent, upsert and assign-if-present writes
//! - Lazy value creation on `get_or_create` misses
//! - A deletion hook that sees every discarded value exactly once
//! - Read-only probes (`contains`, `at`, `peek`) that leave recency alone
//! - Runtime resizing; zero capacity acts as a pass-through
//!
//! # Examples
//!
//! ```rust
//! use hooked_lru::LruCache;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let evicted = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&evicted);
//!
//! let mut cache = LruCache::builder(2)
//!     .on_create(|key: &u64| key * 10)
//!     .on_delete(move |_value: u64| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .build();
//!
//! assert_eq!(cache.get_or_create(1).copied(), Some(10));
//! assert!(cache.insert(2, 20));
//! assert!(cache.insert(3, 30));
//!
//! assert!(!cache.contains(&1));
//! assert_eq!(evicted.load(Ordering::SeqCst), 1);
//! ```

pub mod builder;
pub mod error;
pub mod lru_cache;
pub mod recency_list;

pub use builder::LruCacheBuilder;
pub use error::InvariantError;
pub use lru_cache::{Iter, LruCache};
pub use recency_list::{Handle, RecencyList};
