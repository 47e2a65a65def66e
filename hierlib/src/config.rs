use std::io::Read;
use serde::{Deserialize, Serialize};
use crate::buffers::DEFAULT_BUFFER_CAPACITY;
use crate::error::ConfigError;

/// Access count at which a block is admitted to the prefetch buffer
pub const DEFAULT_PREFETCH_THRESHOLD: u64 = 2;

/// Geometry of the whole two level hierarchy
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct HierarchyConfig {
    pub l1: DirectMappedConfig,
    pub l2: SetAssociativeConfig,
    #[serde(default)]
    pub buffers: BufferConfig,
    #[serde(default = "default_prefetch_threshold")]
    pub prefetch_threshold: u64,
}

/// Geometry of the direct mapped L1
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct DirectMappedConfig {
    pub num_blocks: u64,
    /// Block size in words, a power of two
    pub block_size: u64,
}

/// Geometry of the set associative L2
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct SetAssociativeConfig {
    /// Total number of blocks, divisible by `ways`
    pub num_blocks: u64,
    pub block_size: u64,
    pub ways: u64,
}

/// Capacities of the auxiliary buffers. Each defaults to 4
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct BufferConfig {
    #[serde(default = "default_buffer_capacity")]
    pub victim: usize,
    #[serde(default = "default_buffer_capacity")]
    pub write: usize,
    #[serde(default = "default_buffer_capacity")]
    pub prefetch: usize,
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_prefetch_threshold() -> u64 {
    DEFAULT_PREFETCH_THRESHOLD
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            victim: DEFAULT_BUFFER_CAPACITY,
            write: DEFAULT_BUFFER_CAPACITY,
            prefetch: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// The reference geometry: 2K words of L1 in 16 word blocks, 16K words of 8-way L2
impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            l1: DirectMappedConfig {
                num_blocks: 128,
                block_size: 16,
            },
            l2: SetAssociativeConfig {
                num_blocks: 1024,
                block_size: 16,
                ways: 8,
            },
            buffers: BufferConfig::default(),
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
        }
    }
}

impl HierarchyConfig {
    /// Builds a configuration from the five geometry parameters, with default buffers
    pub fn with_geometry(l1_blocks: u64, l1_block_size: u64, l2_blocks: u64, l2_block_size: u64, l2_ways: u64) -> Self {
        Self {
            l1: DirectMappedConfig {
                num_blocks: l1_blocks,
                block_size: l1_block_size,
            },
            l2: SetAssociativeConfig {
                num_blocks: l2_blocks,
                block_size: l2_block_size,
                ways: l2_ways,
            },
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects geometries that would make indexing meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("l1.num_blocks", self.l1.num_blocks)?;
        positive("l1.block_size", self.l1.block_size)?;
        power_of_two("l1.block_size", self.l1.block_size)?;
        positive("l2.num_blocks", self.l2.num_blocks)?;
        positive("l2.block_size", self.l2.block_size)?;
        power_of_two("l2.block_size", self.l2.block_size)?;
        positive("l2.ways", self.l2.ways)?;
        if self.l2.num_blocks % self.l2.ways != 0 {
            return Err(ConfigError::IndivisibleSets {
                blocks: self.l2.num_blocks,
                ways: self.l2.ways,
            });
        }
        positive("buffers.victim", self.buffers.victim as u64)?;
        positive("buffers.write", self.buffers.write as u64)?;
        positive("buffers.prefetch", self.buffers.prefetch as u64)?;
        positive("prefetch_threshold", self.prefetch_threshold)
    }
}

fn positive(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::NotPositive { field })
    } else {
        Ok(())
    }
}

fn power_of_two(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ConfigError::NotPowerOfTwo { field, value })
    }
}
