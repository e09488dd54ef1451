//! # converge-engine
//!
//! The reconciliation workflow: given a desired configuration, the
//! previously-applied configuration, and a [`RemoteApi`] collaborator,
//! [`reconcile`] emits the minimal ordered set of idempotent remote
//! operations to close the gap and confirms the remote side stabilizes
//! before reporting success.
//!
//! The engine is single-threaded and never blocks: suspension is external.
//! A [`ReconcileStatus::InProgress`] outcome carries a resume delay and a
//! [`WorkflowContext`](converge_core::WorkflowContext) the harness must pass
//! back unchanged on the next invocation.

pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod remote;
pub mod stabilize;

pub use error::{EngineError, ErrorKind, RemoteError};
pub use orchestrator::{
    plan, reconcile, PlanDecision, ReconcileOutcome, ReconcileStatus, StepPlan,
    MODIFY_SETTLE_DELAY_SECONDS,
};
pub use remote::RemoteApi;
pub use stabilize::STABILIZE_DELAY_SECONDS;
