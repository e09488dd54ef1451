//! YAML loading for desired/prior configurations and observed snapshots.

use std::path::Path;

use anyhow::{Context, Result};

use converge_core::{ResourceConfig, StatusSnapshot};

/// Load a [`ResourceConfig`] from a YAML file.
pub fn load_config(path: &Path) -> Result<ResourceConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Load a [`StatusSnapshot`] from a YAML file.
pub fn load_snapshot(path: &Path) -> Result<StatusSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse snapshot file {}", path.display()))
}
