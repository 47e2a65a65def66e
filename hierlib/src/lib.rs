//! # HierLib
//!
//! HierLib models a two level CPU cache hierarchy to estimate the hit and miss behaviour of
//! memory access traces
//!
//! A direct mapped L1 sits in front of a victim buffer, a write buffer, a prefetch buffer and an
//! LRU set associative L2. Traces are plain sequences of (address, is-write) events; no backing
//! memory, timing or coherence is modelled
//!
//! Every address is accepted as a valid reference. There is no address range validation and no
//! payload is ever read or written, so the only errors are invalid configurations and unreadable
//! trace files

/// Contains the two cache levels and the trait they share
pub mod cache;

/// Contains the victim, write and prefetch buffers consulted between L1 and L2
pub mod buffers;

/// Contains definitions for the JSON configuration format and its validation
pub mod config;

/// Error types for configuration and trace input
pub mod error;

/// Access counting used to admit blocks to the prefetch buffer
pub mod frequency;

/// Contains the coordinator walking an access through the whole hierarchy
pub mod hierarchy;

/// Trace file opening
pub mod io;

/// The storage slot shared by the caches and buffers
pub mod line;

/// Contains the replacement policies, with a trait for implementing custom ones
pub mod replacement_policies;

/// Contains the simulator used to run traces and workloads against a configuration
pub mod simulator;

/// Counters and hit rate reports
pub mod stats;

/// Trace events, the text trace parser and the built-in workload
pub mod trace;

#[cfg(test)]
mod test;
