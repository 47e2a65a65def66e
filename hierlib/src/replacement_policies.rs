use crate::line::CacheLine;

/// A generic trait for replacement policies. Used to parameterise a `SetAssociativeCache`.
///
/// Policies read the recency state straight from the lines of the set, so they carry no
/// bookkeeping of their own unless they need it
pub trait ReplacementPolicy {
    /// Updates the policy when a resident line is hit
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `set`: The index of the set the hit happened in
    /// * `slot`: The slot within the set which was hit
    ///
    /// returns: ()
    fn update_on_hit(&mut self, _set: usize, _slot: usize) {}

    /// Picks the slot within `lines` to overwrite when a new block is installed
    ///
    /// Implementations should assume the returned slot is about to be replaced
    ///
    /// # Arguments
    ///
    /// * `set`: The index of the set
    /// * `lines`: The `ways` lines making up the set, in slot order
    ///
    /// returns: usize
    fn select_victim(&mut self, set: usize, lines: &[CacheLine]) -> usize;
}

/// Least Recently Used replacement policy
///
/// A single left-to-right scan keeps the first slot with a strictly smaller last access time.
/// Any invalid slot replaces the current pick as soon as it is seen, so an empty slot always
/// wins over a resident block, and the last empty slot scanned wins among several
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn select_victim(&mut self, _set: usize, lines: &[CacheLine]) -> usize {
        let mut min_index = 0;
        let mut min_value = u64::MAX;
        for (index, line) in lines.iter().enumerate() {
            if !line.valid || line.last_access_time < min_value {
                min_index = index;
                min_value = line.last_access_time;
            }
        }
        min_index
    }
}
