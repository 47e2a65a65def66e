use crate::cache::CacheTrait;
use crate::config::HierarchyConfig;
use crate::error::ConfigError;
use crate::frequency::FrequencyTracker;
use crate::hierarchy::Hierarchy;

fn reference() -> Hierarchy {
    Hierarchy::new(&HierarchyConfig::default()).unwrap()
}

// Addresses 2048 apart share L1 line 0 in the reference geometry
const L1_SPAN: u64 = 128 * 16;

#[test]
fn cold_miss_then_block_hit() {
    let mut hierarchy = reference();
    assert!(!hierarchy.access(0, false));
    for address in 1..16 {
        assert!(hierarchy.access(address, false));
    }
    // New block for L1, but L2 already holds it from the prefetch on the miss at 0
    assert!(hierarchy.access(16, false));
    assert_eq!(hierarchy.stats().l1.misses, 2);
    assert_eq!(hierarchy.stats().l2.searches, 2);
    assert_eq!(hierarchy.stats().l2.misses, 1);

    assert!(hierarchy.access(0, false));
    assert!(hierarchy.l1().contains(0));
}

#[test]
fn reference_layout() {
    let hierarchy = reference();
    assert_eq!(hierarchy.l2().num_sets(), 128);
    assert_eq!(hierarchy.l2().ways(), 8);
    let names: Vec<_> = [hierarchy.victim_buffer(), hierarchy.write_buffer(), hierarchy.prefetch_buffer()]
        .iter()
        .map(|buffer| buffer.name())
        .collect();
    assert_eq!(names, vec!["victim", "write", "prefetch"]);
}

#[test]
fn write_miss_fills_write_buffer() {
    let mut hierarchy = reference();
    assert!(!hierarchy.access(0, true));
    let entries: Vec<_> = hierarchy.write_buffer().iter().collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].valid);
    assert!(entries[0].dirty);
    assert_eq!(entries[0].tag, Some(0));

    // Hits don't add anything
    assert!(hierarchy.access(0, true));
    assert_eq!(hierarchy.write_buffer().len(), 1);
}

#[test]
fn read_hits_in_write_buffer() {
    let mut hierarchy = reference();
    hierarchy.access(0, true);
    // Push block 0 through the victim buffer and out the other side
    for i in 1..=5 {
        assert!(!hierarchy.access(i * L1_SPAN, false));
    }
    assert!(!hierarchy.victim_buffer().lookup(0));
    assert!(hierarchy.write_buffer().lookup(0));

    let l2_searches = hierarchy.stats().l2.searches;
    assert!(hierarchy.access(0, false));
    assert_eq!(hierarchy.stats().l2.searches, l2_searches);
}

#[test]
fn read_hits_in_victim_buffer() {
    let mut hierarchy = reference();
    hierarchy.access(0, false);
    hierarchy.access(L1_SPAN, false);
    assert!(hierarchy.victim_buffer().lookup(0));

    assert!(hierarchy.access(0, false));
    assert_eq!(hierarchy.stats().l2.searches, 2);
    // No swap: the victim entry stays where it is
    assert!(hierarchy.victim_buffer().lookup(0));
    assert_eq!(hierarchy.stats().l1.misses, 3);
}

#[test]
fn read_hits_in_prefetch_buffer() {
    let mut config = HierarchyConfig::default();
    config.buffers.victim = 1;
    let mut hierarchy = Hierarchy::new(&config).unwrap();
    hierarchy.access(0, false);
    hierarchy.access(0, false);
    assert!(hierarchy.prefetch_buffer().lookup(0));

    hierarchy.access(L1_SPAN, false);
    hierarchy.access(2 * L1_SPAN, false);
    assert!(!hierarchy.victim_buffer().lookup(0));

    assert!(hierarchy.access(0, false));
    assert_eq!(hierarchy.stats().l2.searches, 3);
}

#[test]
fn second_access_admits_to_prefetch_buffer() {
    let mut hierarchy = reference();
    hierarchy.access(40, true);
    assert!(!hierarchy.prefetch_buffer().lookup(40 >> 4));
    hierarchy.access(41, false);
    assert!(hierarchy.prefetch_buffer().lookup(40 >> 4));
    assert_eq!(hierarchy.frequency().count(40 >> 4), 2);
}

#[test]
fn admission_happens_on_every_repeat() {
    let mut hierarchy = reference();
    for _ in 0..6 {
        hierarchy.access(0, false);
    }
    assert_eq!(hierarchy.prefetch_buffer().len(), 4);
    assert!(hierarchy.prefetch_buffer().iter().all(|line| line.matches(0) && !line.dirty));
}

#[test]
fn unified_counters_add_up() {
    let mut hierarchy = reference();
    for address in (0..5000).step_by(7) {
        hierarchy.access(address, address % 3 == 0);
    }
    let stats = hierarchy.stats();
    assert_eq!(stats.accesses(), (0..5000).step_by(7).count() as u64);
    assert_eq!(stats.l1.searches, stats.accesses());
}

struct NeverAdmit;

impl FrequencyTracker for NeverAdmit {
    fn record(&mut self, _tag: u64) -> u64 {
        0
    }

    fn count(&self, _tag: u64) -> u64 {
        0
    }

    fn tracked(&self) -> usize {
        0
    }
}

#[test]
fn custom_frequency_tracker() {
    let mut hierarchy = Hierarchy::with_tracker(&HierarchyConfig::default(), NeverAdmit).unwrap();
    for _ in 0..4 {
        hierarchy.access(0, false);
    }
    assert!(hierarchy.prefetch_buffer().is_empty());
}

#[test]
fn rejects_invalid_geometry() {
    let indivisible = Hierarchy::new(&HierarchyConfig::with_geometry(128, 16, 1020, 16, 8));
    assert!(matches!(indivisible, Err(ConfigError::IndivisibleSets { blocks: 1020, ways: 8 })));

    let three_ways = Hierarchy::new(&HierarchyConfig::with_geometry(128, 16, 1024, 16, 3));
    assert!(matches!(three_ways, Err(ConfigError::IndivisibleSets { blocks: 1024, ways: 3 })));

    let no_ways = Hierarchy::new(&HierarchyConfig::with_geometry(128, 16, 1024, 16, 0));
    assert!(matches!(no_ways, Err(ConfigError::NotPositive { field: "l2.ways" })));

    let odd_block = Hierarchy::new(&HierarchyConfig::with_geometry(128, 12, 1024, 16, 8));
    assert!(matches!(odd_block, Err(ConfigError::NotPowerOfTwo { value: 12, .. })));

    let no_lines = Hierarchy::new(&HierarchyConfig::with_geometry(0, 16, 1024, 16, 8));
    assert!(matches!(no_lines, Err(ConfigError::NotPositive { field: "l1.num_blocks" })));
}

#[test]
fn larger_blocks_shift_tags() {
    let config = HierarchyConfig::with_geometry(64, 32, 512, 32, 4);
    let mut hierarchy = Hierarchy::new(&config).unwrap();
    assert!(!hierarchy.access(0, false));
    assert!(hierarchy.access(31, false));
    assert_eq!(hierarchy.l1().get_block_size(), 32);
    assert_eq!(hierarchy.stats().l1.misses, 1);
}
