use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::RingBufferError;

/// Fixed-capacity FIFO staging buffer.
///
/// Logical element `i` lives at physical slot `(head + i) % capacity`, and
/// `tail == (head + count) % capacity` whenever `capacity > 0`. A zero
/// capacity buffer is valid: it is empty and full at the same time.
///
/// Popping does not clear the vacated slots. A popped value stays in storage
/// until a later push lands on its slot, which is when it is dropped.
pub struct RingBuffer<T> {
    buffer: Box<[T]>,
    capacity: usize,
    head: usize,
    tail: usize,
    count: usize,
}

impl<T: Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        op_span!("ring_buffer.new", capacity);
        // Pre-allocate the slots with default values.
        let buffer: Box<[T]> = std::iter::repeat_with(T::default).take(capacity).collect();
        RingBuffer {
            buffer,
            capacity,
            head: 0,
            tail: 0,
            count: 0,
        }
    }
}

impl<T> RingBuffer<T> {
    /// Appends `value` at the tail. Returns false, dropping `value`, when
    /// the buffer is full.
    pub fn push(&mut self, value: T) -> bool {
        op_span!("ring_buffer.push");
        if self.count == self.capacity {
            tracing::trace!(capacity = self.capacity, "push rejected, ring buffer full");
            return false;
        }
        self.buffer[self.tail] = value;
        self.tail = (self.tail + 1) % self.capacity;
        self.count += 1;
        true
    }

    /// Pushes elements in order until one is rejected. Returns how many
    /// were stored.
    pub fn push_n<I>(&mut self, elements: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        op_span!("ring_buffer.push_n");
        let mut pushed = 0;
        for element in elements {
            if !self.push(element) {
                break;
            }
            pushed += 1;
        }
        pushed
    }

    /// Same as [`RingBuffer::push_n`] for a borrowed slice.
    pub fn push_slice(&mut self, elements: &[T]) -> usize
    where
        T: Clone,
    {
        self.push_n(elements.iter().cloned())
    }

    /// Drops the `n` oldest elements from the logical range. All or nothing:
    /// returns false and leaves the buffer untouched when fewer than `n` are
    /// held.
    pub fn pop(&mut self, n: usize) -> bool {
        op_span!("ring_buffer.pop", n);
        if self.count < n {
            tracing::trace!(size = self.count, requested = n, "pop rejected, not enough elements");
            return false;
        }
        if n == 0 {
            return true;
        }
        self.head = (self.head + n) % self.capacity;
        self.count -= n;
        true
    }

    pub fn pop_one(&mut self) -> bool {
        self.pop(1)
    }

    pub fn at(&self, index: usize) -> Result<&T, RingBufferError> {
        let slot = self.physical(index)?;
        Ok(&self.buffer[slot])
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, RingBufferError> {
        let slot = self.physical(index)?;
        Ok(&mut self.buffer[slot])
    }

    /// Returns the number of elements currently stored in the buffer.
    pub fn size(&self) -> usize {
        self.count
    }

    /// Returns the number of free slots.
    pub fn remain(&self) -> usize {
        self.capacity - self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Resets the cursors. Storage is left as is.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Moves the backing store into a new buffer without copying.
    ///
    /// `self` is left as an empty zero-capacity buffer.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    fn physical(&self, index: usize) -> Result<usize, RingBufferError> {
        if index >= self.count {
            tracing::trace!(index, size = self.count, "ring buffer access out of range");
            return Err(RingBufferError::OutOfRange {
                index,
                size: self.count,
            });
        }
        Ok((self.head + index) % self.capacity)
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        RingBuffer {
            buffer: Vec::new().into_boxed_slice(),
            capacity: 0,
            head: 0,
            tail: 0,
            count: 0,
        }
    }
}

/// Deep copy of the live elements. The copy starts at physical slot 0.
impl<T: Clone + Default> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        let mut copy = RingBuffer::new(self.capacity);
        for i in 0..self.count {
            copy.buffer[i] = self[i].clone();
        }
        copy.count = self.count;
        if copy.capacity > 0 {
            copy.tail = copy.count % copy.capacity;
        }
        copy
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T> IndexMut<usize> for RingBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

/// Equal when capacity and the live sequence match; cursor placement is ignored.
impl<T: PartialEq> PartialEq for RingBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity
            && self.count == other.count
            && (0..self.count).all(|i| self[i] == other[i])
    }
}

impl<T: Eq> Eq for RingBuffer<T> {}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Live<'a, T>(&'a RingBuffer<T>);

        impl<T: fmt::Debug> fmt::Debug for Live<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list()
                    .entries((0..self.0.count).map(|i| &self.0[i]))
                    .finish()
            }
        }

        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("elements", &Live(self))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(rb: &RingBuffer<i32>) -> Vec<i32> {
        (0..rb.size()).map(|i| rb[i]).collect()
    }

    #[test]
    fn new_buffer_is_empty() {
        let rb: RingBuffer<i32> = RingBuffer::new(8);
        assert_eq!(rb.size(), 0);
        assert_eq!(rb.remain(), 8);
        assert_eq!(rb.capacity(), 8);
        assert!(rb.is_empty());
        assert!(!rb.is_full());
    }

    #[test]
    fn push_until_full() {
        let mut rb = RingBuffer::new(4);
        for v in 1..=4 {
            assert!(rb.push(v));
        }
        assert!(rb.is_full());
        assert!(!rb.push(5));
        assert_eq!(rb.size(), 4);
        assert_eq!(contents(&rb), vec![1, 2, 3, 4]);
    }

    #[test]
    fn pop_then_push_wraps() {
        let mut rb = RingBuffer::new(4);
        assert_eq!(rb.push_n(1..=4), 4);
        assert!(!rb.push(5));
        assert!(rb.pop_one());
        assert!(rb.push(5));
        assert_eq!(contents(&rb), vec![2, 3, 4, 5]);
        assert_eq!(rb.head, 1);
        assert_eq!(rb.tail, 1);
    }

    #[test]
    fn pop_is_all_or_nothing() {
        let mut rb = RingBuffer::new(4);
        rb.push_n([1, 2]);
        assert!(!rb.pop(3));
        assert_eq!(contents(&rb), vec![1, 2]);
        assert!(rb.pop(2));
        assert!(rb.is_empty());
        assert!(!rb.pop_one());
    }

    #[test]
    fn pop_zero_is_a_no_op() {
        let mut rb = RingBuffer::new(3);
        rb.push(9);
        assert!(rb.pop(0));
        assert_eq!(contents(&rb), vec![9]);

        let mut empty: RingBuffer<i32> = RingBuffer::default();
        assert!(empty.pop(0));
        assert!(!empty.pop_one());
    }

    #[test]
    fn pop_leaves_stale_value_in_storage() {
        let mut rb = RingBuffer::new(2);
        rb.push(42);
        assert!(rb.pop_one());
        assert_eq!(rb.buffer[0], 42);
        assert!(rb.at(0).is_err());
    }

    #[test]
    fn at_checks_logical_size_not_capacity() {
        let mut rb = RingBuffer::new(8);
        rb.push_n([10, 20]);
        assert_eq!(rb.at(1), Ok(&20));
        assert_eq!(
            rb.at(2),
            Err(RingBufferError::OutOfRange { index: 2, size: 2 })
        );
        assert!(rb.at(7).is_err());
    }

    #[test]
    fn at_mut_writes_through() {
        let mut rb = RingBuffer::new(3);
        rb.push_n([1, 2, 3]);
        rb.pop_one();
        rb.push(4);
        *rb.at_mut(2).unwrap() = 40;
        rb[0] += 100;
        assert_eq!(contents(&rb), vec![102, 3, 40]);
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn index_past_size_panics() {
        let rb: RingBuffer<i32> = RingBuffer::new(4);
        let _value = rb[0];
    }

    #[test]
    fn push_n_stops_when_full() {
        let mut rb = RingBuffer::new(5);
        rb.push(0);
        assert_eq!(rb.push_n(vec![1, 2, 3, 4, 5, 6]), 4);
        assert_eq!(contents(&rb), vec![0, 1, 2, 3, 4]);
        assert_eq!(rb.push_n(vec![7]), 0);
    }

    #[test]
    fn push_slice_matches_push_n() {
        let input = [3, 1, 4, 1, 5, 9];
        let mut from_slice = RingBuffer::new(4);
        let mut from_vec = RingBuffer::new(4);
        assert_eq!(from_slice.push_slice(&input), 4);
        assert_eq!(from_vec.push_n(input.to_vec()), 4);
        assert_eq!(from_slice, from_vec);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut rb: RingBuffer<i32> = RingBuffer::new(0);
        assert!(!rb.push(1));
        assert_eq!(rb.push_n([1, 2, 3]), 0);
        assert!(!rb.pop_one());
        assert!(rb.is_empty());
        assert!(rb.is_full());
        assert_eq!(rb.remain(), 0);
        assert!(rb.at(0).is_err());
        rb.clear();
    }

    #[test]
    fn clear_resets_cursors() {
        let mut rb = RingBuffer::new(3);
        rb.push_n([1, 2, 3]);
        rb.pop_one();
        rb.clear();
        assert_eq!((rb.head, rb.tail, rb.count), (0, 0, 0));
        assert_eq!(rb.remain(), 3);
        assert_eq!(rb.push_n([7, 8, 9, 10]), 3);
        assert_eq!(contents(&rb), vec![7, 8, 9]);
    }

    #[test]
    fn clone_normalizes_to_slot_zero() {
        let mut rb = RingBuffer::new(4);
        rb.push_n([1, 2, 3, 4]);
        rb.pop(3);
        rb.push_n([5, 6]);
        let copy = rb.clone();
        assert_eq!(copy.head, 0);
        assert_eq!(copy.tail, 3);
        assert_eq!(contents(&copy), vec![4, 5, 6]);
        assert_eq!(copy, rb);
    }

    #[test]
    fn take_leaves_empty_source() {
        let mut rb = RingBuffer::new(4);
        rb.push_n([1, 2, 3]);
        let moved = rb.take();
        assert_eq!(contents(&moved), vec![1, 2, 3]);
        assert_eq!(rb.size(), 0);
        assert_eq!((rb.head, rb.tail), (0, 0));
        assert!(!rb.push(1));
    }

    #[test]
    fn debug_shows_live_elements_only() {
        let mut rb = RingBuffer::new(3);
        rb.push_n([1, 2, 3]);
        rb.pop_one();
        assert_eq!(
            format!("{:?}", rb),
            "RingBuffer { capacity: 3, head: 1, tail: 0, elements: [2, 3] }"
        );
    }
}
