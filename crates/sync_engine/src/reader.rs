//! Bounded input reader.
//!
//! Events are pulled from the source into a fixed-capacity ring buffer and
//! consumed one at a time. Whatever the caller does not consume stays queued
//! for the next read cycle, so a full output buffer never loses an event.

use std::fmt;
use std::io;

use contracts::{EventSource, RawInputEvent};
use ringbuf::{traits::*, HeapRb};

/// Fixed-capacity event queue in front of an [`EventSource`]
pub struct InputReader {
    queue: HeapRb<RawInputEvent>,
    capacity: usize,
    scratch: Vec<RawInputEvent>,
    total_read: u64,
}

impl fmt::Debug for InputReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputReader")
            .field("len", &self.queue.occupied_len())
            .field("capacity", &self.capacity)
            .field("total_read", &self.total_read)
            .finish()
    }
}

impl InputReader {
    /// Create a reader holding at most `capacity` events (minimum one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: HeapRb::new(capacity),
            capacity,
            scratch: vec![RawInputEvent::default(); capacity],
            total_read: 0,
        }
    }

    /// Top the queue up from `source`
    ///
    /// Reads at most the free space, so nothing already queued is displaced.
    /// Returns the number of events added.
    pub fn fill<S: EventSource + ?Sized>(&mut self, source: &mut S) -> io::Result<usize> {
        let vacant = self.capacity - self.queue.occupied_len();
        if vacant == 0 {
            return Ok(0);
        }

        let n = source.read_into(&mut self.scratch[..vacant])?.min(vacant);
        for event in &self.scratch[..n] {
            let _ = self.queue.try_push(*event);
        }
        self.total_read += n as u64;
        Ok(n)
    }

    /// Oldest queued event without consuming it
    #[inline]
    pub fn peek(&self) -> Option<&RawInputEvent> {
        self.queue.iter().next()
    }

    /// Consume the oldest queued event
    #[inline]
    pub fn next(&mut self) -> Option<RawInputEvent> {
        self.queue.try_pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events pulled from the source since creation
    pub fn total_read(&self) -> u64 {
        self.total_read
    }
}
