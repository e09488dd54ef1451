//! The step orchestrator: a fixed, ordered pipeline of guarded steps.
//!
//! Pipeline order:
//!
//! ```text
//! Probe → PreReboot → TagSync → RoleSync → LoggingSync → ConfigModify
//!       → PostReboot → Verify → Done
//! ```
//!
//! Each state's guard decides whether its remote call fires; a false guard
//! skips the state and control falls through to the next. Every firing
//! state follows the same micro-protocol: translate inputs, invoke the
//! collaborator, then wait for stabilization. The orchestrator never
//! blocks — a not-yet-stable resource produces an `InProgress` outcome with
//! a resume delay, and the harness re-invokes later with the returned
//! context.

use std::time::Duration;

use converge_core::{
    diff::{role_diff, tag_diff},
    drift::{converged, modify_pending, reboot_required},
    Phase, ResourceConfig, StatusSnapshot, StepId, WorkflowContext,
};

use crate::error::{EngineError, RemoteError};
use crate::remote::RemoteApi;
use crate::{probe, stabilize};

/// Delay before re-invocation after the first completed modify, giving the
/// backend time to schedule any maintenance implied by the change before
/// the post-modify reboot decision is made.
pub const MODIFY_SETTLE_DELAY_SECONDS: u64 = 30;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Overall result of one `reconcile` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// The pipeline ran to completion and the final state verified.
    Success,
    /// Suspended; re-invoke after `resume_delay` with the same inputs and
    /// the returned context.
    InProgress,
    /// Terminal failure; see the error kind.
    Failed,
}

/// What `reconcile` hands back to the invoking harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub status: ReconcileStatus,
    /// Context to pass back unchanged on the next invocation.
    pub context: WorkflowContext,
    pub error: Option<EngineError>,
    /// Always present on `InProgress`.
    pub resume_delay: Option<Duration>,
}

impl ReconcileOutcome {
    fn success(context: WorkflowContext) -> Self {
        Self {
            status: ReconcileStatus::Success,
            context,
            error: None,
            resume_delay: None,
        }
    }

    fn in_progress(context: WorkflowContext, delay_seconds: u64) -> Self {
        Self {
            status: ReconcileStatus::InProgress,
            context,
            error: None,
            resume_delay: Some(Duration::from_secs(delay_seconds)),
        }
    }

    fn failed(context: WorkflowContext, error: EngineError) -> Self {
        Self {
            status: ReconcileStatus::Failed,
            context,
            error: Some(error),
            resume_delay: None,
        }
    }
}

// ---------------------------------------------------------------------------
// reconcile
// ---------------------------------------------------------------------------

/// Run (or resume) one reconciliation attempt.
///
/// `desired` and `prior` must be the same values across re-invocations of a
/// suspended attempt; `context` must be the value returned by the previous
/// invocation, or `WorkflowContext::default()` for a fresh attempt.
pub fn reconcile<R: RemoteApi>(
    remote: &mut R,
    desired: &ResourceConfig,
    prior: &ResourceConfig,
    context: WorkflowContext,
) -> ReconcileOutcome {
    let mut ctx = context;
    match drive(remote, desired, prior, &mut ctx) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(resource = %desired.id, phase = %ctx.phase, error = %err, "reconcile failed");
            ReconcileOutcome::failed(ctx, err)
        }
    }
}

fn drive<R: RemoteApi>(
    remote: &mut R,
    desired: &ResourceConfig,
    prior: &ResourceConfig,
    ctx: &mut WorkflowContext,
) -> Result<ReconcileOutcome, EngineError> {
    desired.validate()?;
    let id = &desired.id;

    if ctx.phase == Phase::Probe {
        // The workflow only reconciles resources that already exist.
        if !probe::exists(remote, id)? {
            return Err(RemoteError::NotFound { id: id.to_string() }.into());
        }
        ctx.advance_to(Phase::Step(StepId::PreReboot));
    }

    loop {
        match ctx.phase {
            Phase::Probe => unreachable!("probe handled before the step loop"),
            Phase::Done => return Ok(ReconcileOutcome::success(ctx.clone())),

            Phase::Step(step) => match run_step(remote, desired, prior, step)? {
                StepAction::Fired => {
                    tracing::info!(resource = %id, step = %step, "remote call issued");
                    ctx.advance_to(Phase::Stabilize(step));
                }
                StepAction::NoOp => {
                    tracing::debug!(resource = %id, step = %step, "guard false, skipping");
                    ctx.advance_to(Phase::after(step));
                }
                StepAction::NotReady => {
                    // Verify found the resource still settling; hold here.
                    return Ok(ReconcileOutcome::in_progress(
                        ctx.clone(),
                        stabilize::STABILIZE_DELAY_SECONDS,
                    ));
                }
            },

            Phase::Stabilize(step) => {
                if !stabilize::poll(remote, id)? {
                    return Ok(ReconcileOutcome::in_progress(
                        ctx.clone(),
                        stabilize::STABILIZE_DELAY_SECONDS,
                    ));
                }
                if step == StepId::ConfigModify && !ctx.reboot_signaled {
                    // First completion of the modify step: take a one-time
                    // settle delay before the post-modify reboot decision.
                    ctx.signal_reboot();
                    ctx.advance_to(Phase::after(step));
                    tracing::info!(
                        resource = %id,
                        delay_seconds = MODIFY_SETTLE_DELAY_SECONDS,
                        "modify applied, suspending before reboot decision"
                    );
                    return Ok(ReconcileOutcome::in_progress(
                        ctx.clone(),
                        MODIFY_SETTLE_DELAY_SECONDS,
                    ));
                }
                ctx.advance_to(Phase::after(step));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

enum StepAction {
    /// A remote mutation was issued; stabilization must follow.
    Fired,
    /// Guard false (or verification passed) — fall through to the next step.
    NoOp,
    /// Verify only: the resource has not yet settled; re-invoke later.
    NotReady,
}

fn run_step<R: RemoteApi>(
    remote: &mut R,
    desired: &ResourceConfig,
    prior: &ResourceConfig,
    step: StepId,
) -> Result<StepAction, EngineError> {
    let id = &desired.id;
    match step {
        // Out-of-band drift: the live resource no longer matches what was
        // last applied on restart-class fields, so restart before anything
        // else.
        StepId::PreReboot => {
            let observed = remote.read_status(id)?;
            if reboot_required(prior, &observed) {
                remote.reboot(id)?;
                return Ok(StepAction::Fired);
            }
            Ok(StepAction::NoOp)
        }

        StepId::TagSync => {
            let delta = tag_diff(&prior.tags, &desired.tags);
            if delta.is_empty() {
                return Ok(StepAction::NoOp);
            }
            remote.apply_tag_delta(id, &delta.to_remove, &delta.to_add)?;
            Ok(StepAction::Fired)
        }

        StepId::RoleSync => {
            let delta = role_diff(&prior.roles, &desired.roles);
            if delta.is_empty() {
                return Ok(StepAction::NoOp);
            }
            remote.apply_role_delta(id, &delta.to_remove, &delta.to_add)?;
            Ok(StepAction::Fired)
        }

        StepId::LoggingSync => match &desired.logging {
            None => {
                let observed = remote.read_status(id)?;
                if observed.logging_enabled {
                    remote.set_logging(id, None)?;
                    return Ok(StepAction::Fired);
                }
                Ok(StepAction::NoOp)
            }
            Some(config) => {
                if desired.logging != prior.logging {
                    remote.set_logging(id, Some(config))?;
                    return Ok(StepAction::Fired);
                }
                Ok(StepAction::NoOp)
            }
        },

        StepId::ConfigModify => {
            if modify_pending(prior, desired) {
                remote.modify_config(id, desired, prior)?;
                return Ok(StepAction::Fired);
            }
            Ok(StepAction::NoOp)
        }

        // Reboot need introduced by this update, decided against a fresh
        // snapshot rather than the request payload.
        StepId::PostReboot => {
            let observed = remote.read_status(id)?;
            if reboot_required(desired, &observed) {
                remote.reboot(id)?;
                return Ok(StepAction::Fired);
            }
            Ok(StepAction::NoOp)
        }

        StepId::Verify => {
            let observed = remote.read_status(id)?;
            if !observed.is_steady() {
                return Ok(StepAction::NotReady);
            }
            if !converged(desired, &observed) {
                return Err(EngineError::Diverged {
                    id: id.to_string(),
                    detail: divergence_detail(desired, &observed),
                });
            }
            Ok(StepAction::NoOp)
        }
    }
}

fn divergence_detail(desired: &ResourceConfig, observed: &StatusSnapshot) -> String {
    let mut fields = Vec::new();
    if observed.node_type != desired.node_type {
        fields.push(format!(
            "node_type {} != desired {}",
            observed.node_type, desired.node_type
        ));
    }
    if observed.node_count != desired.node_count {
        fields.push(format!(
            "node_count {} != desired {}",
            observed.node_count, desired.node_count
        ));
    }
    if observed.logging_enabled != desired.logging.is_some() {
        fields.push(format!(
            "logging_enabled {} != desired {}",
            observed.logging_enabled,
            desired.logging.is_some()
        ));
    }
    fields.join(", ")
}

// ---------------------------------------------------------------------------
// Dry-run planning
// ---------------------------------------------------------------------------

/// Planned decision for one pipeline step, without touching the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanDecision {
    /// The guard is true; the step would issue a remote call.
    Fires { detail: String },
    /// The guard is false; the step would be skipped.
    Skips,
    /// The guard needs an observed snapshot that was not supplied.
    Unknown,
}

/// One row of a reconciliation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    pub step: StepId,
    pub decision: PlanDecision,
}

/// Evaluate every step guard against the given inputs without issuing any
/// remote call. Guards that depend on live state report [`PlanDecision::Unknown`]
/// when `observed` is `None`.
pub fn plan(
    desired: &ResourceConfig,
    prior: &ResourceConfig,
    observed: Option<&StatusSnapshot>,
) -> Vec<StepPlan> {
    StepId::ALL
        .iter()
        .map(|&step| StepPlan {
            step,
            decision: plan_step(desired, prior, observed, step),
        })
        .collect()
}

fn plan_step(
    desired: &ResourceConfig,
    prior: &ResourceConfig,
    observed: Option<&StatusSnapshot>,
    step: StepId,
) -> PlanDecision {
    match step {
        StepId::PreReboot => match observed {
            None => PlanDecision::Unknown,
            Some(snapshot) if reboot_required(prior, snapshot) => PlanDecision::Fires {
                detail: "restart-class drift from last-applied config".to_string(),
            },
            Some(_) => PlanDecision::Skips,
        },
        StepId::TagSync => {
            let delta = tag_diff(&prior.tags, &desired.tags);
            if delta.is_empty() {
                PlanDecision::Skips
            } else {
                PlanDecision::Fires {
                    detail: format!("-{} +{} tag(s)", delta.to_remove.len(), delta.to_add.len()),
                }
            }
        }
        StepId::RoleSync => {
            let delta = role_diff(&prior.roles, &desired.roles);
            if delta.is_empty() {
                PlanDecision::Skips
            } else {
                PlanDecision::Fires {
                    detail: format!(
                        "-{} +{} role(s)",
                        delta.to_remove.len(),
                        delta.to_add.len()
                    ),
                }
            }
        }
        StepId::LoggingSync => match &desired.logging {
            None => match observed {
                None => PlanDecision::Unknown,
                Some(snapshot) if snapshot.logging_enabled => PlanDecision::Fires {
                    detail: "disable logging".to_string(),
                },
                Some(_) => PlanDecision::Skips,
            },
            Some(config) if desired.logging != prior.logging => PlanDecision::Fires {
                detail: format!("enable logging to bucket {}", config.bucket),
            },
            Some(_) => PlanDecision::Skips,
        },
        StepId::ConfigModify => {
            if modify_pending(prior, desired) {
                PlanDecision::Fires {
                    detail: "modify-class fields changed".to_string(),
                }
            } else {
                PlanDecision::Skips
            }
        }
        StepId::PostReboot => match observed {
            None => PlanDecision::Unknown,
            Some(snapshot) if reboot_required(desired, snapshot) => PlanDecision::Fires {
                detail: "restart-class settings pending".to_string(),
            },
            Some(_) => PlanDecision::Skips,
        },
        StepId::Verify => PlanDecision::Fires {
            detail: "final state read".to_string(),
        },
    }
}
