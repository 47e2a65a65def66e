use std::fmt;
use serde::{Deserialize, Serialize};

/// Counters kept by a single cache level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct LevelStats {
    pub misses: u64,
    pub searches: u64,
    pub read_misses: u64,
    pub write_misses: u64,
    /// Blocks installed by next-block prefetching. Only L2 prefetches
    pub prefetches: u64,
}

impl LevelStats {
    pub(crate) fn record_search(&mut self) {
        self.searches += 1;
    }

    pub(crate) fn record_miss(&mut self, is_write: bool) {
        self.misses += 1;
        if is_write {
            self.write_misses += 1;
        } else {
            self.read_misses += 1;
        }
    }

    /// Hit rate as a percentage, `None` before the first search
    pub fn hit_rate(&self) -> Option<f64> {
        percentage(self.searches - self.misses, self.searches)
    }
}

/// Read-only snapshot of every counter in the hierarchy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct HierarchyStats {
    pub l1: LevelStats,
    pub l2: LevelStats,
    pub unified_hits: u64,
    pub unified_misses: u64,
}

impl HierarchyStats {
    /// Number of accesses applied to the hierarchy
    pub fn accesses(&self) -> u64 {
        self.unified_hits + self.unified_misses
    }

    pub fn unified_hit_rate(&self) -> Option<f64> {
        percentage(self.unified_hits, self.accesses())
    }

    /// Builds the presentable report for this snapshot
    pub fn report(&self) -> HierarchyReport {
        HierarchyReport {
            l1: report("L1", &self.l1),
            l2: report("L2", &self.l2),
            unified: UnifiedReport {
                hits: self.unified_hits,
                misses: self.unified_misses,
                hit_rate: self.unified_hit_rate(),
            },
        }
    }
}

/// Guarded `numerator / denominator` as a percentage
fn percentage(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64 * 100.0)
    }
}

/// Report for one cache level. Can be serialised for the JSON output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelReport {
    pub name: String,
    pub misses: u64,
    pub searches: u64,
    pub read_misses: u64,
    pub write_misses: u64,
    pub prefetches: u64,
    /// Percentage, `null` when nothing was searched yet
    pub hit_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnifiedReport {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: Option<f64>,
}

/// Report for the whole hierarchy. Can be serialised, or printed with `Display`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HierarchyReport {
    pub l1: LevelReport,
    pub l2: LevelReport,
    pub unified: UnifiedReport,
}

/// Derives the hit rate of a level from its counters
///
/// # Arguments
///
/// * `label`: The name shown for the level
/// * `stats`: The counters of the level
///
/// returns: LevelReport
pub fn report(label: &str, stats: &LevelStats) -> LevelReport {
    LevelReport {
        name: label.to_string(),
        misses: stats.misses,
        searches: stats.searches,
        read_misses: stats.read_misses,
        write_misses: stats.write_misses,
        prefetches: stats.prefetches,
        hit_rate: stats.hit_rate(),
    }
}

struct Rate(Option<f64>);

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(rate) => write!(f, "{rate:.2}%"),
            None => write!(f, "no data"),
        }
    }
}

impl fmt::Display for LevelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Cache Stats:", self.name)?;
        writeln!(f, "Cache Misses: {}", self.misses)?;
        writeln!(f, "Cache Searches: {}", self.searches)?;
        writeln!(f, "Cache Hit Rate: {}", Rate(self.hit_rate))?;
        writeln!(f, "Read Misses: {}", self.read_misses)?;
        writeln!(f, "Write Misses: {}", self.write_misses)?;
        if self.prefetches > 0 {
            writeln!(f, "Prefetches: {}", self.prefetches)?;
        }
        Ok(())
    }
}

impl fmt::Display for HierarchyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.l1)?;
        write!(f, "{}", self.l2)?;
        writeln!(f, "Overall Unified Cache Stats:")?;
        writeln!(f, "Unified Hits: {}", self.unified.hits)?;
        writeln!(f, "Unified Misses: {}", self.unified.misses)?;
        write!(f, "Unified Hit Rate: {}", Rate(self.unified.hit_rate))
    }
}
