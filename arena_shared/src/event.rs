//! FIFO event queue and sequence dedupe.
//!
//! Events are applied strictly in arrival order and each is handed out once.
//! Draining never reorders or drops entries.

use std::collections::{vec_deque, BTreeSet, VecDeque};

#[derive(Debug)]
pub struct EventQueue<E> {
    queue: VecDeque<E>,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an event onto the back of the queue.
    pub fn push(&mut self, e: E) {
        self.queue.push_back(e);
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&mut self) -> vec_deque::Drain<'_, E> {
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Remembers which sequence numbers were delivered.
///
/// Everything at or below `floor` has been seen; later numbers that arrived
/// ahead of a gap sit in `ahead` until the gap fills. Sequence numbers start at 1.
#[derive(Debug, Default, Clone)]
pub struct SeqFilter {
    floor: u64,
    ahead: BTreeSet<u64>,
}

impl SeqFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `seq`. Returns false if it was already seen.
    pub fn insert(&mut self, seq: u64) -> bool {
        if seq <= self.floor || !self.ahead.insert(seq) {
            return false;
        }
        while self.ahead.remove(&(self.floor + 1)) {
            self.floor += 1;
        }
        true
    }

    pub fn contains(&self, seq: u64) -> bool {
        seq <= self.floor || self.ahead.contains(&seq)
    }

    /// Highest sequence number below which nothing is missing.
    pub fn floor(&self) -> u64 {
        self.floor
    }

    /// Number of sequence numbers held past a gap.
    pub fn pending_gaps(&self) -> usize {
        self.ahead.len()
    }
}
