//! # converge-core
//!
//! Domain model for the converge reconciliation engine:
//! - [`types`] — identifiers, configuration, and status snapshot shapes
//! - [`diff`] — symmetric-difference engine for tags and role attachments
//! - [`drift`] — modify-pending / reboot-required / converged predicates
//! - [`context`] — the resumable [`WorkflowContext`] and pipeline phases
//! - [`error`] — local [`ValidationError`]s
//!
//! Everything here is pure: no I/O, no clocks, no remote calls.

pub mod context;
pub mod diff;
pub mod drift;
pub mod error;
pub mod types;

pub use context::{Phase, StepId, WorkflowContext};
pub use diff::{diff, role_diff, tag_diff, DiffResult};
pub use error::ValidationError;
pub use types::{
    LoggingConfig, ResourceConfig, ResourceId, ResourceStatus, RoleArn, StatusSnapshot, Tag,
};
