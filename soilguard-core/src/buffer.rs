//! Bounded Circular Buffer for Readings and Alerts
//!
//! ## Overview
//!
//! The engine keeps two sliding windows: the last 25 sensor readings and the
//! last 8 alerts. Both are "keep the most recent N, drop the oldest" windows,
//! so both are backed by the same ring buffer.
//!
//! Capacity is chosen at construction time (it comes from
//! [`EngineConfig`](crate::config::EngineConfig)) and the backing storage is
//! allocated once. Pushing never allocates afterwards.
//!
//! ```text
//! CircularBuffer with capacity 5, after 7 pushes (A..G):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F  │  G  │  C  │  D  │  E  │  ← storage
//! └─────┴─────┴─────┴─────┴─────┘
//!          ↑     ↑
//!          │     └── oldest (write_pos = 2)
//!          └── newest
//!
//! Logical view (oldest → newest): C D E F G
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use soilguard_core::buffer::CircularBuffer;
//!
//! let mut window: CircularBuffer<u32> = CircularBuffer::with_capacity(3);
//! for i in 0..5 {
//!     window.push(i);
//! }
//!
//! let oldest_first: Vec<_> = window.iter().copied().collect();
//! assert_eq!(oldest_first, vec![2, 3, 4]);
//!
//! let newest_first: Vec<_> = window.iter_newest_first().copied().collect();
//! assert_eq!(newest_first, vec![4, 3, 2]);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Fixed-capacity ring buffer that overwrites its oldest entry when full
///
/// ## Internal Invariants
///
/// - `slots.len() == capacity` and `capacity > 0`
/// - `write_pos < capacity`
/// - `len <= capacity`
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    /// Storage; `None` marks slots never written since the last clear
    slots: Vec<Option<T>>,

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of valid entries
    len: usize,
}

impl<T> CircularBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` entries
    ///
    /// A capacity of zero is bumped to one; engine configuration rejects zero
    /// capacities before a buffer is ever built.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots,
            write_pos: 0,
            len: 0,
        }
    }

    /// Adds an entry, evicting and returning the oldest one if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = self.slots[self.write_pos].replace(item);
        self.write_pos = (self.write_pos + 1) % self.capacity();

        if self.len < self.capacity() {
            self.len += 1;
            None
        } else {
            evicted
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// The most recently pushed entry
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        self.get(self.len - 1)
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.write_pos = 0;
        self.len = 0;
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T> {
        CircularBufferIter {
            buffer: self,
            front: 0,
            back: self.len,
        }
    }

    /// Entries from newest to oldest
    pub fn iter_newest_first(&self) -> core::iter::Rev<CircularBufferIter<'_, T>> {
        self.iter().rev()
    }

    /// Entry by logical index (0 = oldest, len-1 = newest)
    ///
    /// When the buffer is full the oldest entry sits at `write_pos`, so the
    /// logical index is offset from there:
    ///
    /// ```text
    /// Physical:  [D, E, A, B, C]  (write_pos = 2)
    /// Logical:   [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % capacity]
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let physical = if self.len < self.capacity() {
            index
        } else {
            (self.write_pos + index) % self.capacity()
        };

        self.slots[physical].as_ref()
    }
}

/// Iterator over circular buffer contents in logical order
pub struct CircularBufferIter<'a, T> {
    buffer: &'a CircularBuffer<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for CircularBufferIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }

        let item = self.buffer.get(self.front)?;
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for CircularBufferIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }

        self.back -= 1;
        self.buffer.get(self.back)
    }
}

impl<'a, T> ExactSizeIterator for CircularBufferIter<'a, T> {}

impl<T: Clone> CircularBuffer<T> {
    /// Owned copy of the contents, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Owned copy of the contents, newest first
    pub fn to_vec_newest_first(&self) -> Vec<T> {
        self.iter_newest_first().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for CircularBuffer<T> {
    /// Two buffers are equal when they hold the same entries in the same
    /// logical order and have the same capacity, regardless of where the
    /// write cursor sits.
    fn eq(&self, other: &Self) -> bool {
        self.capacity() == other.capacity()
            && self.len == other.len
            && (0..self.len).all(|i| self.get(i) == other.get(i))
    }
}
