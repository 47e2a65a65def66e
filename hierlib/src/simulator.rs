use std::io::BufRead;
use std::time::{Duration, Instant};
use log::debug;
use crate::cache::CacheTrait;
use crate::config::HierarchyConfig;
use crate::error::{ConfigError, TraceError};
use crate::hierarchy::Hierarchy;
use crate::stats::HierarchyReport;
use crate::trace::{Phase, TraceEvent, TraceReader};

/// The simulator feeds traces through a hierarchy and collects results.
///
/// It supports calling simulate multiple times, state and statistics carry over between calls,
/// and the time taken to simulate is accumulated
#[derive(Debug)]
pub struct Simulator {
    hierarchy: Hierarchy,
    simulation_time: Duration,
    events: u64,
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn new(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            hierarchy: Hierarchy::new(config)?,
            simulation_time: Duration::new(0, 0),
            events: 0,
        })
    }

    /// Applies a trace, in order, and reports the cumulative statistics
    ///
    /// # Arguments
    ///
    /// * `trace`: The events, consumed one at a time
    ///
    /// returns: HierarchyReport
    pub fn simulate<I: IntoIterator<Item = TraceEvent>>(&mut self, trace: I) -> HierarchyReport {
        let start = Instant::now();
        for event in trace {
            self.apply(event);
        }
        self.simulation_time += start.elapsed();
        self.report()
    }

    /// Simulates a text trace, stopping at the first line that can't be read
    ///
    /// Events before a bad line stay applied
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace, see `trace::parse_line` for the format
    ///
    /// returns: Result<HierarchyReport, TraceError>
    pub fn simulate_reader<R: BufRead>(&mut self, reader: R) -> Result<HierarchyReport, TraceError> {
        let start = Instant::now();
        let result = TraceReader::new(reader).try_for_each(|event| {
            self.apply(event?);
            Ok::<(), TraceError>(())
        });
        self.simulation_time += start.elapsed();
        result.map(|_| self.report())
    }

    /// Runs one phase of a workload
    pub fn run_phase(&mut self, phase: &Phase) -> HierarchyReport {
        let report = self.simulate(phase.events());
        debug!(
            "{}: {} events, unified hit rate {:?}",
            phase.name,
            phase.len(),
            report.unified.hit_rate
        );
        report
    }

    fn apply(&mut self, event: TraceEvent) {
        let _ = self.hierarchy.access(event.address, event.is_write);
        self.events += 1;
    }

    pub fn report(&self) -> HierarchyReport {
        self.hierarchy.stats().report()
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Number of events applied so far
    pub fn get_event_count(&self) -> u64 {
        self.events
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of lines never filled, L1 first
    pub fn get_uninitialised_line_counts(&self) -> Vec<u64> {
        vec![
            self.hierarchy.l1().get_uninitialised_line_count() as u64,
            self.hierarchy.l2().get_uninitialised_line_count() as u64,
        ]
    }
}
