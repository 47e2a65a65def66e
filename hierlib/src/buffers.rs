use std::collections::VecDeque;
use log::trace;
use crate::line::CacheLine;

/// Default capacity of the victim, write and prefetch buffers
pub const DEFAULT_BUFFER_CAPACITY: usize = 4;

/// A small bounded buffer of lines sitting between L1 and L2
///
/// All three auxiliary structures behave the same way: lines are appended at the back, the
/// oldest line at the front is dropped once the buffer is full, and lookups scan linearly by
/// tag without changing anything. Entries are not deduplicated, the same tag can be held more
/// than once
///
/// Nothing dropped from a buffer goes anywhere, there is no backing store. For the write buffer
/// this models the flush of the oldest pending write
#[derive(Debug, Clone)]
pub struct LineBuffer {
    name: &'static str,
    capacity: usize,
    lines: VecDeque<CacheLine>,
}

impl LineBuffer {
    /// Creates an empty buffer. `capacity` must be positive
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    pub fn victim(capacity: usize) -> Self {
        Self::new("victim", capacity)
    }

    pub fn write(capacity: usize) -> Self {
        Self::new("write", capacity)
    }

    pub fn prefetch(capacity: usize) -> Self {
        Self::new("prefetch", capacity)
    }

    /// True if any valid entry holds `tag`
    pub fn lookup(&self, tag: u64) -> bool {
        self.lines.iter().any(|line| line.matches(tag))
    }

    /// Appends a line, first dropping the oldest entry when the buffer is full
    ///
    /// # Arguments
    ///
    /// * `line`: The line to append
    ///
    /// returns: Option<CacheLine>, the entry dropped to make room
    pub fn insert(&mut self, line: CacheLine) -> Option<CacheLine> {
        let displaced = if self.lines.len() >= self.capacity {
            self.lines.pop_front()
        } else {
            None
        };
        if let Some(old) = &displaced {
            trace!("{} buffer full, dropping block {:?}", self.name, old.tag);
        }
        self.lines.push_back(line);
        displaced
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &CacheLine> {
        self.lines.iter()
    }
}
