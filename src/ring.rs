//! Fixed-capacity FIFO used for the movement queue and the sub-movement
//! lookahead.
//!
//! Wraps `heapless::Deque` with the producer/consumer vocabulary of the
//! tracer: the producer commits with [`RingBuffer::try_push`], the consumer
//! reads the head with [`RingBuffer::peek`] and releases it with
//! [`RingBuffer::discard`] or [`RingBuffer::pop`].

use heapless::Deque;

/// A single-producer single-consumer ring buffer of `C` slots.
#[derive(Debug)]
pub struct RingBuffer<T, const C: usize> {
    slots: Deque<T, C>,
}

impl<T, const C: usize> RingBuffer<T, C> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self { slots: Deque::new() }
    }

    /// Total number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Number of stored elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of free slots.
    #[inline]
    pub fn available_spaces(&self) -> usize {
        C - self.slots.len()
    }

    /// Check whether no element is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check whether every slot is used.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// Commit an element at the tail, handing it back when no slot is free.
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        self.slots.push_back(value)
    }

    /// Read the head without releasing it.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.slots.front()
    }

    /// Mutable access to the head.
    #[inline]
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.slots.front_mut()
    }

    /// Remove and return the head.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.slots.pop_front()
    }

    /// Release the head. Returns `false` when the buffer was empty.
    pub fn discard(&mut self) -> bool {
        self.slots.pop_front().is_some()
    }

    /// The most recently committed element.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.slots.back()
    }

    /// Mutable access to the most recently committed element.
    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.slots.back_mut()
    }

    /// Iterate from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    /// Iterate mutably from head to tail.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<T, const C: usize> Default for RingBuffer<T, C> {
    fn default() -> Self {
        Self::new()
    }
}
