use std::collections::HashMap;
use log::trace;
use crate::line::CacheLine;
use crate::replacement_policies::{LeastRecentlyUsed, ReplacementPolicy};
use crate::stats::LevelStats;

/// What a single level reports back for one access
///
/// Evictions are handed back to the caller instead of being pushed anywhere, the owner of the
/// level decides what happens to them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessOutcome {
    pub hit: bool,
    /// Copy of the valid line overwritten by this access, if any
    pub evicted: Option<CacheLine>,
}

impl AccessOutcome {
    fn hit() -> Self {
        Self { hit: true, evicted: None }
    }

    fn miss(evicted: Option<CacheLine>) -> Self {
        Self { hit: false, evicted }
    }
}

/// A generic trait for the cache levels of the hierarchy
///
/// Only two kinds exist, and the coordinator holds both concretely, so this is static dispatch
/// only. It gives the reporting and debugging code one surface for either level
pub trait CacheTrait {
    /// Converts an address into a set (or line) index and a tag
    ///
    /// The tag is the address with the block offset shifted out, so it identifies the memory
    /// block regardless of the set it maps to
    ///
    /// # Arguments
    ///
    /// * `address`: Any address, no range validation is done
    ///
    /// returns: (usize, u64)
    fn address_to_set_and_tag(&self, address: u64) -> (usize, u64);

    /// Looks up an address, returning whether it hit
    ///
    /// On both hits and misses the implementation must update its counters, recency state and
    /// residency. Every call counts as exactly one search
    ///
    /// # Arguments
    ///
    /// * `address`: The address of the access
    /// * `is_write`: Whether the access is a write; sets dirty on the touched line
    ///
    /// returns: AccessOutcome
    fn access(&mut self, address: u64, is_write: bool) -> AccessOutcome;

    /// Gets the block size in words used by this level
    fn get_block_size(&self) -> u64;

    /// Gets the counters of this level
    fn stats(&self) -> &LevelStats;

    fn get_misses(&self) -> u64 {
        self.stats().misses
    }

    fn get_searches(&self) -> u64 {
        self.stats().searches
    }

    /// Gets the number of lines which never held a block. Useful for analysing cache
    /// performance or debugging
    fn get_uninitialised_line_count(&self) -> usize;
}

/// Number of offset bits for a power of two block size
#[inline]
fn offset_bits(block_size: u64) -> u32 {
    block_size.trailing_zeros()
}

/// Direct mapped cache, used as L1
///
/// Line `i` only ever holds blocks whose `(address >> offset_bits) % num_blocks == i`
#[derive(Debug)]
pub struct DirectMappedCache {
    lines: Vec<CacheLine>,
    block_size: u64,
    offset_bits: u32,
    current_time: u64,
    stats: LevelStats,
}

impl DirectMappedCache {
    /// Creates an empty cache. The geometry must already be validated
    pub fn new(num_blocks: u64, block_size: u64) -> Self {
        Self {
            lines: vec![CacheLine::new(block_size); num_blocks as usize],
            block_size,
            offset_bits: offset_bits(block_size),
            current_time: 0,
            stats: LevelStats::default(),
        }
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// The line at a given index
    pub fn line(&self, index: usize) -> Option<&CacheLine> {
        self.lines.get(index)
    }

    /// True if the block holding `address` is resident, without counting a search
    pub fn contains(&self, address: u64) -> bool {
        let (index, tag) = self.address_to_set_and_tag(address);
        self.lines[index].matches(tag)
    }
}

impl CacheTrait for DirectMappedCache {
    fn address_to_set_and_tag(&self, address: u64) -> (usize, u64) {
        let tag = address >> self.offset_bits;
        ((tag % self.lines.len() as u64) as usize, tag)
    }

    fn access(&mut self, address: u64, is_write: bool) -> AccessOutcome {
        self.current_time += 1;
        self.stats.record_search();
        let (index, tag) = self.address_to_set_and_tag(address);
        let line = &mut self.lines[index];
        if line.matches(tag) {
            line.touch(self.current_time, is_write);
            return AccessOutcome::hit();
        }
        self.stats.record_miss(is_write);
        // Dirty or not, the old block only leaves as a copy, nothing is written back
        let evicted = line.valid.then(|| line.clone());
        line.install(tag, self.current_time, is_write);
        AccessOutcome::miss(evicted)
    }

    fn get_block_size(&self) -> u64 {
        self.block_size
    }

    fn stats(&self) -> &LevelStats {
        &self.stats
    }

    fn get_uninitialised_line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.valid).count()
    }
}

/// N-way set associative cache, parameterised by a replacement policy. Used as L2
///
/// Lines are stored flat, set `s` occupying `lines[s * ways..(s + 1) * ways]`. Each set keeps a
/// tag to slot map so hits don't scan the set. The map is kept in step with the lines: a tag is
/// mapped iff a valid line of that set holds it
///
/// Every miss also prefetches the block directly after the missed one
#[derive(Debug)]
pub struct SetAssociativeCache<R: ReplacementPolicy = LeastRecentlyUsed> {
    lines: Vec<CacheLine>,
    tag_to_slot: Vec<HashMap<u64, usize>>,
    ways: usize,
    block_size: u64,
    offset_bits: u32,
    current_time: u64,
    stats: LevelStats,
    replacement_policy: R,
}

impl SetAssociativeCache<LeastRecentlyUsed> {
    /// Creates an empty LRU cache. The geometry must already be validated
    pub fn new(num_blocks: u64, block_size: u64, ways: u64) -> Self {
        Self::with_policy(num_blocks, block_size, ways, LeastRecentlyUsed)
    }
}

impl<R: ReplacementPolicy> SetAssociativeCache<R> {
    pub fn with_policy(num_blocks: u64, block_size: u64, ways: u64, policy: R) -> Self {
        let num_sets = (num_blocks / ways) as usize;
        Self {
            lines: vec![CacheLine::new(block_size); num_blocks as usize],
            tag_to_slot: vec![HashMap::new(); num_sets],
            ways: ways as usize,
            block_size,
            offset_bits: offset_bits(block_size),
            current_time: 0,
            stats: LevelStats::default(),
            replacement_policy: policy,
        }
    }

    pub fn num_sets(&self) -> usize {
        self.tag_to_slot.len()
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    /// The lines of one set, in slot order
    pub fn set(&self, set: usize) -> &[CacheLine] {
        let base = set * self.ways;
        &self.lines[base..base + self.ways]
    }

    /// True if the block holding `address` is resident, without counting a search
    pub fn contains(&self, address: u64) -> bool {
        let (set, tag) = self.address_to_set_and_tag(address);
        self.tag_to_slot[set].contains_key(&tag)
    }

    /// Brings the block holding `address` in if it isn't resident
    ///
    /// Uses the same victim selection as a demand miss, but installs clean, doesn't count as a
    /// search and never prefetches further
    pub fn prefetch(&mut self, address: u64) {
        let (set, tag) = self.address_to_set_and_tag(address);
        if self.tag_to_slot[set].contains_key(&tag) {
            return;
        }
        self.stats.prefetches += 1;
        trace!("L2 prefetch of block {tag:#x} into set {set}");
        if let Some(evicted) = self.install(set, tag, false) {
            trace!("L2 prefetch evicted block {:?} (dirty: {})", evicted.tag, evicted.dirty);
        }
    }

    /// Overwrites the replacement victim of `set` with `tag`, returning the line it replaced
    fn install(&mut self, set: usize, tag: u64, dirty: bool) -> Option<CacheLine> {
        let base = set * self.ways;
        let slot = self.replacement_policy.select_victim(set, &self.lines[base..base + self.ways]);
        let line = &mut self.lines[base + slot];
        let evicted = if line.valid {
            if let Some(old_tag) = line.tag {
                self.tag_to_slot[set].remove(&old_tag);
            }
            Some(line.clone())
        } else {
            None
        };
        line.install(tag, self.current_time, dirty);
        self.tag_to_slot[set].insert(tag, slot);
        evicted
    }

    /// Checks the tag maps against the lines. Used by the tests
    #[cfg(test)]
    pub(crate) fn tag_map_is_consistent(&self) -> bool {
        (0..self.num_sets()).all(|set| {
            let lines = self.set(set);
            let mapped = &self.tag_to_slot[set];
            let valid = lines.iter().filter(|line| line.valid).count();
            mapped.len() == valid
                && mapped.len() <= self.ways
                && mapped.iter().all(|(tag, slot)| lines[*slot].matches(*tag))
        })
    }
}

impl<R: ReplacementPolicy> CacheTrait for SetAssociativeCache<R> {
    fn address_to_set_and_tag(&self, address: u64) -> (usize, u64) {
        let tag = address >> self.offset_bits;
        ((tag % self.tag_to_slot.len() as u64) as usize, tag)
    }

    fn access(&mut self, address: u64, is_write: bool) -> AccessOutcome {
        self.current_time += 1;
        self.stats.record_search();
        let (set, tag) = self.address_to_set_and_tag(address);
        if let Some(&slot) = self.tag_to_slot[set].get(&tag) {
            self.lines[set * self.ways + slot].touch(self.current_time, is_write);
            self.replacement_policy.update_on_hit(set, slot);
            return AccessOutcome::hit();
        }
        self.stats.record_miss(is_write);
        // Prefetch goes first, it may itself claim a slot in another set
        self.prefetch(address.wrapping_add(self.block_size));
        let evicted = self.install(set, tag, is_write);
        AccessOutcome::miss(evicted)
    }

    fn get_block_size(&self) -> u64 {
        self.block_size
    }

    fn stats(&self) -> &LevelStats {
        &self.stats
    }

    fn get_uninitialised_line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.valid).count()
    }
}
