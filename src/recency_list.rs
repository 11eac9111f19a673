//! Recency ordering for [`LruCache`](crate::LruCache).
//!
//! A doubly linked list whose nodes live in a slot arena and point at each
//! other by index instead of by pointer. Each inserted element gets a
//! [`Handle`] that stays valid until that element is removed, no matter how
//! many other elements are pushed, moved or removed in the meantime.
//!
//! Slots carry a generation that is bumped whenever their element is
//! removed, so a handle to a removed element never resolves to whatever
//! element later reuses the slot.
//!
//! ```text
//!   slots: [ g0:A | g1:- | g0:C | g0:B ]      free: [1]
//!
//!   head ─► [0:A] ◄──► [3:B] ◄──► [2:C] ◄── tail
//!           (MRU)                 (LRU)
//! ```
//!
//! `push_front`, `remove`, `move_to_front` and `pop_back` are all O(1).

use std::collections::HashSet;

use crate::error::InvariantError;

/// Stable position token for an element of a [`RecencyList`].
///
/// Once the element it names is removed the handle is dead: every lookup
/// through it fails, even after the slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    generation: u32,
}

impl Handle {
    /// Arena slot this handle refers to.
    pub fn index(self) -> usize {
        self.index
    }
}

// Internal node structure for the doubly linked list
#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<Handle>,
    next: Option<Handle>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Arena-backed doubly linked list, front = most recent, back = least recent.
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl<T> RecencyList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `handle` names a live element.
    pub fn contains(&self, handle: Handle) -> bool {
        self.node(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.node(handle).map(|node| &node.value)
    }

    /// Most recently used element.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|h| self.get(h))
    }

    /// Least recently used element, i.e. the next eviction candidate.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|h| self.get(h))
    }

    /// Iterates from front (MRU) to back (LRU).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
            remaining: self.len,
        }
    }

    // Insert value at the front of the list
    pub fn push_front(&mut self, value: T) -> Handle {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                Handle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                Handle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        self.len += 1;
        self.attach_front(handle);
        handle
    }

    // Remove the element named by `handle` and free its slot
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        self.detach(handle);
        let node = self.release(handle.index)?;
        self.len -= 1;
        Some(node.value)
    }

    // Remove element from the back
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Relocates an element to the front. Returns `false` for a dead handle.
    pub fn move_to_front(&mut self, handle: Handle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        if self.head != Some(handle) {
            self.detach(handle);
            self.attach_front(handle);
        }
        true
    }

    /// Drops every element. Slots are kept for reuse, and every handle
    /// issued so far becomes dead.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free.clear();
        self.free.extend((0..self.slots.len()).rev());
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Walks the list front to back and checks that links, length and the
    /// free list agree with each other.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut seen = HashSet::with_capacity(self.len);
        let mut prev = None;
        let mut current = self.head;

        while let Some(handle) = current {
            let node = self
                .node(handle)
                .ok_or(InvariantError::BrokenLink(handle.index))?;
            if node.prev != prev || !seen.insert(handle) || seen.len() > self.len {
                return Err(InvariantError::BrokenLink(handle.index));
            }
            prev = Some(handle);
            current = node.next;
        }

        if prev != self.tail {
            let at = self.tail.or(prev).map_or(0, Handle::index);
            return Err(InvariantError::BrokenLink(at));
        }
        if seen.len() != self.len || self.len + self.free.len() != self.slots.len() {
            return Err(InvariantError::WalkMismatch {
                walked: seen.len(),
                len: self.len,
            });
        }
        Ok(())
    }

    fn node(&self, handle: Handle) -> Option<&Node<T>> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, handle: Handle) -> Option<&mut Node<T>> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    // Empty the slot and retire its generation
    fn release(&mut self, index: usize) -> Option<Node<T>> {
        let slot = self.slots.get_mut(index)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(node)
    }

    fn detach(&mut self, handle: Handle) {
        let (prev, next) = match self.node_mut(handle) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(prev_handle) => {
                if let Some(prev_node) = self.node_mut(prev_handle) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_handle) => {
                if let Some(next_node) = self.node_mut(next_handle) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn attach_front(&mut self, handle: Handle) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(handle) {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(head) => {
                if let Some(head_node) = self.node_mut(head) {
                    head_node.prev = Some(handle);
                }
            }
            // Empty list case
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<Handle>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.current?;
        let node = self.list.node(handle)?;
        self.current = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
