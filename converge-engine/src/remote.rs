//! The collaborator contract for the remote service.
//!
//! The engine never constructs wire requests or owns a transport client; it
//! consumes these operations as opaque capabilities. Every mutation is
//! idempotent on retry given consistent diff inputs, which is what makes
//! whole-attempt re-invocation the recovery mechanism.

use std::collections::BTreeSet;

use converge_core::{LoggingConfig, ResourceConfig, ResourceId, RoleArn, StatusSnapshot, Tag};

use crate::error::RemoteError;

/// Remote operations the orchestrator composes into a reconciliation.
pub trait RemoteApi {
    /// Whether the resource currently exists remotely.
    fn probe_exists(&mut self, id: &ResourceId) -> Result<bool, RemoteError>;

    /// Remove then add tags on the resource.
    fn apply_tag_delta(
        &mut self,
        id: &ResourceId,
        to_remove: &BTreeSet<Tag>,
        to_add: &BTreeSet<Tag>,
    ) -> Result<(), RemoteError>;

    /// Detach then attach role attachments on the resource.
    fn apply_role_delta(
        &mut self,
        id: &ResourceId,
        to_remove: &BTreeSet<RoleArn>,
        to_add: &BTreeSet<RoleArn>,
    ) -> Result<(), RemoteError>;

    /// Enable/update logging with the given config, or disable it (`None`).
    fn set_logging(
        &mut self,
        id: &ResourceId,
        config: Option<&LoggingConfig>,
    ) -> Result<(), RemoteError>;

    /// Apply the modify-class configuration fields.
    fn modify_config(
        &mut self,
        id: &ResourceId,
        desired: &ResourceConfig,
        prior: &ResourceConfig,
    ) -> Result<(), RemoteError>;

    /// Restart the resource so staged reboot-class settings take effect.
    fn reboot(&mut self, id: &ResourceId) -> Result<(), RemoteError>;

    /// Read a point-in-time status snapshot.
    fn read_status(&mut self, id: &ResourceId) -> Result<StatusSnapshot, RemoteError>;
}
