//! Persisted resumable workflow context.
//!
//! A suspended reconciliation hands its [`WorkflowContext`] back to the
//! caller; this store keeps that context between CLI invocations as a JSON
//! document at `<home>/.converge/contexts/<resource_id>.json`, written with
//! the atomic `.tmp` + rename pattern.
//!
//! The stored record carries a digest of the desired configuration it
//! belongs to: a context saved for one desired state must not resume a
//! reconciliation of a different one, so a digest mismatch discards it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use converge_core::{ResourceConfig, ResourceId, WorkflowContext};

/// All errors that can arise from context-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("context store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

/// On-disk context payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextFile {
    pub saved_at: DateTime<Utc>,
    /// SHA-256 hex digest of the desired config this context belongs to.
    pub desired_digest: String,
    pub context: WorkflowContext,
}

/// Hex digest identifying a desired configuration.
pub fn desired_digest(config: &ResourceConfig) -> Result<String, StoreError> {
    let canonical = serde_json::to_vec(config)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

/// `<home>/.converge/contexts/<resource_id>.json` — pure, no I/O.
pub fn store_path_at(home: &Path, id: &ResourceId) -> PathBuf {
    home.join(".converge")
        .join("contexts")
        .join(format!("{}.json", id.0))
}

/// Load the stored context for `id`, if one exists and still matches the
/// given desired-config digest.
///
/// Returns `Ok(None)` when the file is absent or the digest differs (the
/// desired config changed while the workflow was suspended — resuming with
/// the old context would skip steps the new config needs).
pub fn load_at(
    home: &Path,
    id: &ResourceId,
    digest: &str,
) -> Result<Option<WorkflowContext>, StoreError> {
    let file = read_at(home, id)?;
    match file {
        None => Ok(None),
        Some(file) if file.desired_digest != digest => {
            tracing::warn!(resource = %id, "stored context is for a different desired config, discarding");
            Ok(None)
        }
        Some(file) => Ok(Some(file.context)),
    }
}

/// Load the raw stored record for `id` without digest checking (inspection).
pub fn read_at(home: &Path, id: &ResourceId) -> Result<Option<ContextFile>, StoreError> {
    let path = store_path_at(home, id);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save the context for `id` atomically.
pub fn save_at(
    home: &Path,
    id: &ResourceId,
    digest: &str,
    context: &WorkflowContext,
) -> Result<(), StoreError> {
    let path = store_path_at(home, id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file = ContextFile {
        saved_at: Utc::now(),
        desired_digest: digest.to_string(),
        context: context.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Remove the stored context for `id`. Returns whether a file was removed.
pub fn clear_at(home: &Path, id: &ResourceId) -> Result<bool, StoreError> {
    let path = store_path_at(home, id);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(&path, err)),
    }
}

#[cfg(test)]
mod tests {
    use converge_core::{Phase, StepId};
    use tempfile::TempDir;

    use super::*;

    fn sample_config() -> ResourceConfig {
        ResourceConfig {
            id: ResourceId::from("analytics-main"),
            node_type: "dc2.large".to_string(),
            node_count: 2,
            maintenance_window: None,
            tags: vec![],
            roles: vec![],
            logging: None,
            parameter_group: None,
            maintenance_track: None,
            enhanced_routing: false,
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let home = TempDir::new().expect("home");
        let loaded =
            load_at(home.path(), &ResourceId::from("analytics-main"), "digest").expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let home = TempDir::new().expect("home");
        let config = sample_config();
        let digest = desired_digest(&config).expect("digest");
        let context = WorkflowContext {
            phase: Phase::Step(StepId::PostReboot),
            reboot_signaled: true,
        };

        save_at(home.path(), &config.id, &digest, &context).expect("save");
        let loaded = load_at(home.path(), &config.id, &digest).expect("load");
        assert_eq!(loaded, Some(context));
    }

    #[test]
    fn digest_mismatch_discards_stored_context() {
        let home = TempDir::new().expect("home");
        let config = sample_config();
        let digest = desired_digest(&config).expect("digest");
        let context = WorkflowContext {
            phase: Phase::Stabilize(StepId::ConfigModify),
            reboot_signaled: true,
        };
        save_at(home.path(), &config.id, &digest, &context).expect("save");

        let mut changed = config.clone();
        changed.node_count = 8;
        let new_digest = desired_digest(&changed).expect("digest");
        assert_ne!(digest, new_digest);

        let loaded = load_at(home.path(), &config.id, &new_digest).expect("load");
        assert!(loaded.is_none(), "stale context must be discarded");
    }

    #[test]
    fn clear_removes_the_file_once() {
        let home = TempDir::new().expect("home");
        let config = sample_config();
        let digest = desired_digest(&config).expect("digest");
        save_at(home.path(), &config.id, &digest, &WorkflowContext::default()).expect("save");

        assert!(clear_at(home.path(), &config.id).expect("clear"));
        assert!(!clear_at(home.path(), &config.id).expect("clear again"));
    }

    #[test]
    fn digest_is_stable_across_identical_configs() {
        let a = desired_digest(&sample_config()).expect("digest");
        let b = desired_digest(&sample_config()).expect("digest");
        assert_eq!(a, b);
    }
}
