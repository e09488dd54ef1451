//! File-backed remote — a local `RemoteApi` harness.
//!
//! `converge run` drives the engine against a YAML document standing in for
//! the remote service. Every operation loads the document, applies the
//! mutation, and writes it back atomically, so an interrupted run leaves a
//! consistent state behind.
//!
//! The document can stage restart-class settings under `pending:` (applied
//! and cleared by `reboot`) and simulate stabilization latency with
//! `settle_reads_after_mutation` (the resource reports `modifying` for that
//! many status reads after each mutation).

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use converge_core::{
    LoggingConfig, ResourceConfig, ResourceId, ResourceStatus, RoleArn, StatusSnapshot, Tag,
};
use converge_engine::{RemoteApi, RemoteError};

/// Restart-class settings staged for the next reboot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingRestart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_routing: Option<bool>,
}

/// The full simulated remote resource state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteState {
    #[serde(default = "default_exists")]
    pub exists: bool,
    pub status: ResourceStatus,
    pub node_type: String,
    pub node_count: u32,
    #[serde(default)]
    pub logging_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_track: Option<String>,
    #[serde(default)]
    pub enhanced_routing: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub roles: Vec<RoleArn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingRestart>,
    /// How many status reads report `modifying` after each mutation.
    #[serde(default)]
    pub settle_reads_after_mutation: u8,
    /// Remaining unstable reads (managed by the harness).
    #[serde(default)]
    pub settle_reads: u8,
}

fn default_exists() -> bool {
    true
}

impl RemoteState {
    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            node_type: self.node_type.clone(),
            node_count: self.node_count,
            logging_enabled: self.logging_enabled,
            parameter_group: self.parameter_group.clone(),
            maintenance_track: self.maintenance_track.clone(),
            enhanced_routing: self.enhanced_routing,
        }
    }

    fn mark_mutated(&mut self) {
        self.settle_reads = self.settle_reads_after_mutation;
    }
}

/// A `RemoteApi` over a YAML state file.
pub struct FileRemote {
    path: PathBuf,
}

impl FileRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<RemoteState, RemoteError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| RemoteError::Service {
            reason: format!("read {}: {e}", self.path.display()),
        })?;
        serde_yaml::from_str(&contents).map_err(|e| RemoteError::Service {
            reason: format!("parse {}: {e}", self.path.display()),
        })
    }

    fn save(&self, state: &RemoteState) -> Result<(), RemoteError> {
        let yaml = serde_yaml::to_string(state).map_err(|e| RemoteError::Service {
            reason: format!("serialize remote state: {e}"),
        })?;
        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));
        std::fs::write(&tmp, yaml).map_err(|e| RemoteError::Service {
            reason: format!("write {}: {e}", tmp.display()),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| RemoteError::Service {
            reason: format!("rename to {}: {e}", self.path.display()),
        })
    }

    fn mutate<F>(&self, id: &ResourceId, apply: F) -> Result<(), RemoteError>
    where
        F: FnOnce(&mut RemoteState),
    {
        let mut state = self.load()?;
        if !state.exists {
            return Err(RemoteError::NotFound { id: id.to_string() });
        }
        if state.status != ResourceStatus::Available {
            return Err(RemoteError::InvalidRequest {
                reason: format!("resource {id} is {} and rejects mutations", state.status),
            });
        }
        apply(&mut state);
        state.mark_mutated();
        self.save(&state)
    }
}

impl RemoteApi for FileRemote {
    fn probe_exists(&mut self, _id: &ResourceId) -> Result<bool, RemoteError> {
        Ok(self.load()?.exists)
    }

    fn apply_tag_delta(
        &mut self,
        id: &ResourceId,
        to_remove: &BTreeSet<Tag>,
        to_add: &BTreeSet<Tag>,
    ) -> Result<(), RemoteError> {
        self.mutate(id, |state| {
            state.tags.retain(|tag| !to_remove.contains(tag));
            state.tags.extend(to_add.iter().cloned());
            state.tags.sort();
            state.tags.dedup();
        })
    }

    fn apply_role_delta(
        &mut self,
        id: &ResourceId,
        to_remove: &BTreeSet<RoleArn>,
        to_add: &BTreeSet<RoleArn>,
    ) -> Result<(), RemoteError> {
        self.mutate(id, |state| {
            state.roles.retain(|role| !to_remove.contains(role));
            state.roles.extend(to_add.iter().cloned());
            state.roles.sort();
            state.roles.dedup();
        })
    }

    fn set_logging(
        &mut self,
        id: &ResourceId,
        config: Option<&LoggingConfig>,
    ) -> Result<(), RemoteError> {
        self.mutate(id, |state| {
            state.logging_enabled = config.is_some();
        })
    }

    fn modify_config(
        &mut self,
        id: &ResourceId,
        desired: &ResourceConfig,
        _prior: &ResourceConfig,
    ) -> Result<(), RemoteError> {
        self.mutate(id, |state| {
            state.node_type = desired.node_type.clone();
            state.node_count = desired.node_count;
        })
    }

    fn reboot(&mut self, id: &ResourceId) -> Result<(), RemoteError> {
        self.mutate(id, |state| {
            if let Some(pending) = state.pending.take() {
                if let Some(parameter_group) = pending.parameter_group {
                    state.parameter_group = Some(parameter_group);
                }
                if let Some(maintenance_track) = pending.maintenance_track {
                    state.maintenance_track = Some(maintenance_track);
                }
                if let Some(enhanced_routing) = pending.enhanced_routing {
                    state.enhanced_routing = enhanced_routing;
                }
            }
        })
    }

    fn read_status(&mut self, id: &ResourceId) -> Result<StatusSnapshot, RemoteError> {
        let mut state = self.load()?;
        if !state.exists {
            return Err(RemoteError::NotFound { id: id.to_string() });
        }
        if state.settle_reads > 0 {
            state.settle_reads -= 1;
            self.save(&state)?;
            let mut snapshot = state.snapshot();
            snapshot.status = ResourceStatus::Modifying;
            return Ok(snapshot);
        }
        Ok(state.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_state(dir: &TempDir, state: &RemoteState) -> PathBuf {
        let path = dir.path().join("remote.yaml");
        fs::write(&path, serde_yaml::to_string(state).expect("serialize")).expect("write");
        path
    }

    fn base_state() -> RemoteState {
        RemoteState {
            exists: true,
            status: ResourceStatus::Available,
            node_type: "dc2.large".to_string(),
            node_count: 2,
            logging_enabled: false,
            parameter_group: Some("pg-v1".to_string()),
            maintenance_track: None,
            enhanced_routing: false,
            tags: vec![Tag::new("env", "prod")],
            roles: vec![],
            pending: None,
            settle_reads_after_mutation: 0,
            settle_reads: 0,
        }
    }

    #[test]
    fn tag_delta_removes_then_adds() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_state(&dir, &base_state());
        let mut remote = FileRemote::new(&path);
        let id = ResourceId::from("analytics-main");

        let to_remove = [Tag::new("env", "prod")].into();
        let to_add = [Tag::new("env", "staging"), Tag::new("team", "data")].into();
        remote.apply_tag_delta(&id, &to_remove, &to_add).expect("apply");

        let state = remote.load().expect("reload");
        assert_eq!(
            state.tags,
            vec![Tag::new("env", "staging"), Tag::new("team", "data")]
        );
    }

    #[test]
    fn reboot_applies_and_clears_pending_settings() {
        let dir = TempDir::new().expect("tempdir");
        let mut initial = base_state();
        initial.pending = Some(PendingRestart {
            parameter_group: Some("pg-v2".to_string()),
            maintenance_track: None,
            enhanced_routing: Some(true),
        });
        let path = write_state(&dir, &initial);
        let mut remote = FileRemote::new(&path);
        let id = ResourceId::from("analytics-main");

        remote.reboot(&id).expect("reboot");

        let state = remote.load().expect("reload");
        assert_eq!(state.parameter_group.as_deref(), Some("pg-v2"));
        assert!(state.enhanced_routing);
        assert!(state.pending.is_none());
    }

    #[test]
    fn settle_counter_reports_modifying_then_recovers() {
        let dir = TempDir::new().expect("tempdir");
        let mut initial = base_state();
        initial.settle_reads_after_mutation = 1;
        let path = write_state(&dir, &initial);
        let mut remote = FileRemote::new(&path);
        let id = ResourceId::from("analytics-main");

        remote.set_logging(&id, None).expect("mutate");

        let first = remote.read_status(&id).expect("read");
        assert_eq!(first.status, ResourceStatus::Modifying);
        let second = remote.read_status(&id).expect("read");
        assert_eq!(second.status, ResourceStatus::Available);
    }

    #[test]
    fn missing_resource_reads_as_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let mut initial = base_state();
        initial.exists = false;
        let path = write_state(&dir, &initial);
        let mut remote = FileRemote::new(&path);
        let id = ResourceId::from("analytics-main");

        assert_eq!(remote.probe_exists(&id), Ok(false));
        assert!(matches!(
            remote.read_status(&id),
            Err(RemoteError::NotFound { .. })
        ));
    }

    #[test]
    fn mutations_rejected_while_not_available() {
        let dir = TempDir::new().expect("tempdir");
        let mut initial = base_state();
        initial.status = ResourceStatus::Rebooting;
        let path = write_state(&dir, &initial);
        let mut remote = FileRemote::new(&path);
        let id = ResourceId::from("analytics-main");

        let err = remote.set_logging(&id, None).expect_err("must reject");
        assert!(matches!(err, RemoteError::InvalidRequest { .. }));
    }
}
