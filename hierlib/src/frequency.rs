use std::collections::HashMap;

/// Counts accesses per block, deciding admission to the prefetch buffer
///
/// Kept behind a trait so the coordinator doesn't depend on how counts are stored or aged
pub trait FrequencyTracker {
    /// Counts one more access to `tag`, returning the count after the increment
    fn record(&mut self, tag: u64) -> u64;

    /// Current count for `tag`, zero if never seen
    fn count(&self, tag: u64) -> u64;

    /// Number of distinct blocks tracked
    fn tracked(&self) -> usize;
}

/// Counts every block ever accessed, forever
///
/// Counts are never reset and entries never evicted, so memory grows with the number of
/// distinct blocks in the trace
#[derive(Debug, Default, Clone)]
pub struct FrequencyMap {
    counts: HashMap<u64, u64>,
}

impl FrequencyTracker for FrequencyMap {
    fn record(&mut self, tag: u64) -> u64 {
        let count = self.counts.entry(tag).or_insert(0);
        *count += 1;
        *count
    }

    fn count(&self, tag: u64) -> u64 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    fn tracked(&self) -> usize {
        self.counts.len()
    }
}
