use thiserror::Error;

/// Reasons a hierarchy geometry is rejected at construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },

    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: u64 },

    #[error("L2 block count {blocks} is not divisible by its associativity ({ways} ways)")]
    IndivisibleSets { blocks: u64, ways: u64 },

    #[error("couldn't parse the configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while reading a text trace
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: couldn't parse trace event {text:?}")]
    Malformed { line: usize, text: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
