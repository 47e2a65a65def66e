use log::{debug, trace};
use crate::buffers::LineBuffer;
use crate::cache::{CacheTrait, DirectMappedCache, SetAssociativeCache};
use crate::config::HierarchyConfig;
use crate::error::ConfigError;
use crate::frequency::{FrequencyMap, FrequencyTracker};
use crate::line::CacheLine;
use crate::stats::HierarchyStats;

/// Two level cache hierarchy: a direct mapped L1, three auxiliary buffers, and an LRU L2
///
/// Each access walks L1, the victim buffer, the write buffer, the prefetch buffer and L2 in that
/// order, stopping at the first hit. The frequency counts and the buffers are then updated
/// whatever the outcome, and exactly one of the unified counters is bumped
///
/// The hierarchy owns all of its state. Independent runs use independent values, but the
/// accesses of one run must be applied in trace order
#[derive(Debug)]
pub struct Hierarchy<F: FrequencyTracker = FrequencyMap> {
    l1: DirectMappedCache,
    l2: SetAssociativeCache,
    victim_buffer: LineBuffer,
    write_buffer: LineBuffer,
    prefetch_buffer: LineBuffer,
    frequency: F,
    prefetch_threshold: u64,
    unified_hits: u64,
    unified_misses: u64,
}

impl Hierarchy<FrequencyMap> {
    /// Creates an empty hierarchy, rejecting invalid geometries
    ///
    /// # Arguments
    ///
    /// * `config`: The geometry, usually resulting from parsing JSON
    ///
    /// returns: Result<Hierarchy, ConfigError>
    pub fn new(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        Self::with_tracker(config, FrequencyMap::default())
    }
}

impl<F: FrequencyTracker> Hierarchy<F> {
    /// Creates an empty hierarchy admitting prefetches through a custom frequency tracker
    pub fn with_tracker(config: &HierarchyConfig, frequency: F) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            "L1: {} x {} words direct mapped, L2: {} x {} words {}-way, buffers: {:?}",
            config.l1.num_blocks, config.l1.block_size, config.l2.num_blocks, config.l2.block_size, config.l2.ways, config.buffers
        );
        Ok(Self {
            l1: DirectMappedCache::new(config.l1.num_blocks, config.l1.block_size),
            l2: SetAssociativeCache::new(config.l2.num_blocks, config.l2.block_size, config.l2.ways),
            victim_buffer: LineBuffer::victim(config.buffers.victim),
            write_buffer: LineBuffer::write(config.buffers.write),
            prefetch_buffer: LineBuffer::prefetch(config.buffers.prefetch),
            frequency,
            prefetch_threshold: config.prefetch_threshold,
            unified_hits: 0,
            unified_misses: 0,
        })
    }

    /// Applies one access to the hierarchy, returning whether any structure hit
    ///
    /// Every address is accepted, there is no range validation
    ///
    /// # Arguments
    ///
    /// * `address`: The accessed address, in words
    /// * `is_write`: Whether the access is a write
    ///
    /// returns: bool
    pub fn access(&mut self, address: u64, is_write: bool) -> bool {
        // Buffers share L1's notion of a block
        let tag = address >> self.l1.offset_bits();
        let hit = self.lookup(address, tag, is_write);

        // Admission is by frequency alone, hits included
        if self.frequency.record(tag) >= self.prefetch_threshold {
            let line = self.buffer_line(tag, false);
            let _ = self.prefetch_buffer.insert(line);
        }
        if !hit && is_write {
            let line = self.buffer_line(tag, true);
            let _ = self.write_buffer.insert(line);
        }

        if hit {
            self.unified_hits += 1;
        } else {
            self.unified_misses += 1;
        }
        hit
    }

    /// Walks the levels in order, stopping at the first hit
    fn lookup(&mut self, address: u64, tag: u64, is_write: bool) -> bool {
        let l1 = self.l1.access(address, is_write);
        if let Some(evicted) = l1.evicted {
            trace!("L1 evicted block {:?} (dirty: {}) to the victim buffer", evicted.tag, evicted.dirty);
            let _ = self.victim_buffer.insert(evicted);
        }
        if l1.hit {
            return true;
        }
        // A victim hit is not promoted back into L1
        if self.victim_buffer.lookup(tag) {
            return true;
        }
        if self.write_buffer.lookup(tag) {
            return true;
        }
        if self.prefetch_buffer.lookup(tag) {
            return true;
        }
        let l2 = self.l2.access(address, is_write);
        if let Some(evicted) = l2.evicted {
            trace!("L2 evicted block {:?} (dirty: {})", evicted.tag, evicted.dirty);
        }
        l2.hit
    }

    fn buffer_line(&self, tag: u64, dirty: bool) -> CacheLine {
        CacheLine::holding(tag, self.l1.get_block_size(), dirty)
    }

    /// Snapshot of all counters
    pub fn stats(&self) -> HierarchyStats {
        HierarchyStats {
            l1: *self.l1.stats(),
            l2: *self.l2.stats(),
            unified_hits: self.unified_hits,
            unified_misses: self.unified_misses,
        }
    }

    pub fn l1(&self) -> &DirectMappedCache {
        &self.l1
    }

    pub fn l2(&self) -> &SetAssociativeCache {
        &self.l2
    }

    pub fn victim_buffer(&self) -> &LineBuffer {
        &self.victim_buffer
    }

    pub fn write_buffer(&self) -> &LineBuffer {
        &self.write_buffer
    }

    pub fn prefetch_buffer(&self) -> &LineBuffer {
        &self.prefetch_buffer
    }

    pub fn frequency(&self) -> &F {
        &self.frequency
    }
}
