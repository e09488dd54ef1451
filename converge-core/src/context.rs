//! Resumable workflow context.
//!
//! The context is the only state carried across suspend/resume cycles. It is
//! threaded through `reconcile` as a value (immutable-in / immutable-out from
//! the caller's perspective) and serialized opaquely by the invoking harness.
//!
//! Monotonicity: [`Phase`] is totally ordered and only ever advances within
//! one logical update, and `reboot_signaled` is set-once. A context handed
//! back on resume therefore never re-runs a completed step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The pipeline steps, in the fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    /// Restart needed by out-of-band drift, before any other step.
    PreReboot,
    /// Apply the tag symmetric difference.
    TagSync,
    /// Apply the role-attachment symmetric difference.
    RoleSync,
    /// Enable, update, or disable audit logging.
    LoggingSync,
    /// Apply modify-class configuration fields.
    ConfigModify,
    /// Restart needed by the just-applied change.
    PostReboot,
    /// Final state read and convergence check.
    Verify,
}

impl StepId {
    /// All steps in execution order.
    pub const ALL: [StepId; 7] = [
        StepId::PreReboot,
        StepId::TagSync,
        StepId::RoleSync,
        StepId::LoggingSync,
        StepId::ConfigModify,
        StepId::PostReboot,
        StepId::Verify,
    ];

    /// The step after this one, or `None` for the last.
    pub fn next(self) -> Option<StepId> {
        let index = StepId::ALL.iter().position(|s| *s == self)?;
        StepId::ALL.get(index + 1).copied()
    }

    fn index(self) -> u8 {
        StepId::ALL.iter().position(|s| *s == self).unwrap_or(0) as u8
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepId::PreReboot => "pre-reboot",
            StepId::TagSync => "tag-sync",
            StepId::RoleSync => "role-sync",
            StepId::LoggingSync => "logging-sync",
            StepId::ConfigModify => "config-modify",
            StepId::PostReboot => "post-reboot",
            StepId::Verify => "verify",
        };
        f.write_str(s)
    }
}

/// Where a reconciliation attempt currently stands.
///
/// Total order: `Probe < Step(s) < Stabilize(s) < Step(next(s)) < … < Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Existence probe has not yet passed.
    Probe,
    /// About to evaluate (and possibly fire) the given step.
    Step(StepId),
    /// The step's mutation was issued; waiting for the resource to return
    /// to its steady status.
    Stabilize(StepId),
    /// Pipeline finished.
    Done,
}

impl Phase {
    fn rank(self) -> u8 {
        match self {
            Phase::Probe => 0,
            Phase::Step(step) => 1 + step.index() * 2,
            Phase::Stabilize(step) => 2 + step.index() * 2,
            Phase::Done => u8::MAX,
        }
    }

    /// The phase following a completed step: the next step, or `Done`.
    pub fn after(step: StepId) -> Phase {
        match step.next() {
            Some(next) => Phase::Step(next),
            None => Phase::Done,
        }
    }
}

impl PartialOrd for Phase {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Phase {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Probe => f.write_str("probe"),
            Phase::Step(step) => write!(f, "step:{step}"),
            Phase::Stabilize(step) => write!(f, "stabilize:{step}"),
            Phase::Done => f.write_str("done"),
        }
    }
}

/// The persisted record carried across suspend/resume cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowContext {
    /// Resume point within the pipeline.
    pub phase: Phase,
    /// Set once, after the first completed modify call, to mark that the
    /// post-modify settle delay has already been taken.
    #[serde(default)]
    pub reboot_signaled: bool,
}

impl Default for WorkflowContext {
    fn default() -> Self {
        Self {
            phase: Phase::Probe,
            reboot_signaled: false,
        }
    }
}

impl WorkflowContext {
    /// Advance to a later (or equal) phase. Never moves backwards.
    pub fn advance_to(&mut self, phase: Phase) {
        debug_assert!(phase >= self.phase, "phase must advance monotonically");
        if phase > self.phase {
            self.phase = phase;
        }
    }

    /// Mark the post-modify settle delay as taken. Set-once.
    pub fn signal_reboot(&mut self) {
        self.reboot_signaled = true;
    }
}
