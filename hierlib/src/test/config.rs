use std::error::Error;
use crate::config::HierarchyConfig;
use crate::error::ConfigError;

#[test]
fn parses_minimal_config() -> Result<(), Box<dyn Error>> {
    let json = r#"{
        "l1": { "num_blocks": 128, "block_size": 16 },
        "l2": { "num_blocks": 1024, "block_size": 16, "ways": 8 }
    }"#;
    let config = HierarchyConfig::from_reader(json.as_bytes())?;
    assert_eq!(config, HierarchyConfig::default());
    Ok(())
}

#[test]
fn partial_buffer_section_keeps_defaults() -> Result<(), Box<dyn Error>> {
    let json = r#"{
        "l1": { "num_blocks": 64, "block_size": 8 },
        "l2": { "num_blocks": 512, "block_size": 8, "ways": 4 },
        "buffers": { "victim": 8 },
        "prefetch_threshold": 3
    }"#;
    let config = HierarchyConfig::from_reader(json.as_bytes())?;
    assert_eq!(config.buffers.victim, 8);
    assert_eq!(config.buffers.write, 4);
    assert_eq!(config.buffers.prefetch, 4);
    assert_eq!(config.prefetch_threshold, 3);
    Ok(())
}

#[test]
fn rejects_bad_json() {
    let result = HierarchyConfig::from_reader("{ \"l1\": 3 }".as_bytes());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn validation_runs_on_parse() {
    let json = r#"{
        "l1": { "num_blocks": 128, "block_size": 16 },
        "l2": { "num_blocks": 1024, "block_size": 16, "ways": 3 }
    }"#;
    let result = HierarchyConfig::from_reader(json.as_bytes());
    assert!(matches!(result, Err(ConfigError::IndivisibleSets { blocks: 1024, ways: 3 })));
}

#[test]
fn zero_capacity_buffers_are_rejected() {
    let mut config = HierarchyConfig::default();
    config.buffers.write = 0;
    assert!(matches!(config.validate(), Err(ConfigError::NotPositive { field: "buffers.write" })));
    config.buffers.write = 4;
    config.prefetch_threshold = 0;
    assert!(matches!(config.validate(), Err(ConfigError::NotPositive { field: "prefetch_threshold" })));
}

#[test]
fn config_serialises_back() -> Result<(), Box<dyn Error>> {
    let config = HierarchyConfig::with_geometry(32, 4, 256, 8, 2);
    let json = serde_json::to_string(&config)?;
    assert_eq!(HierarchyConfig::from_reader(json.as_bytes())?, config);
    Ok(())
}
