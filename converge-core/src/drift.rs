//! Drift predicates over the two configuration field classes.
//!
//! - *modify-class* fields are applied by a single `modify_config` call and
//!   take effect immediately: `node_type`, `node_count`,
//!   `maintenance_window`.
//! - *reboot-class* fields are staged on the remote side and only take
//!   effect after an explicit restart: `parameter_group`,
//!   `maintenance_track`, `enhanced_routing`. This allow-list is fixed.
//!
//! Both predicates are pure; the reboot predicate is always evaluated
//! against a freshly read [`StatusSnapshot`], never against a request
//! payload.

use crate::types::{ResourceConfig, StatusSnapshot};

/// True when any modify-class field differs between prior and desired, i.e.
/// the orchestrator must issue a `modify_config` call.
pub fn modify_pending(prior: &ResourceConfig, desired: &ResourceConfig) -> bool {
    prior.node_type != desired.node_type
        || prior.node_count != desired.node_count
        || prior.maintenance_window != desired.maintenance_window
}

/// True when any reboot-class field of `target` differs from the observed
/// effective value — the remote resource needs an explicit restart before
/// it matches `target`.
///
/// Called twice per reconciliation: before any step runs (with the prior
/// config as target, to catch out-of-band drift) and after the modify step
/// (with the desired config as target).
pub fn reboot_required(target: &ResourceConfig, observed: &StatusSnapshot) -> bool {
    target.parameter_group != observed.parameter_group
        || target.maintenance_track != observed.maintenance_track
        || target.enhanced_routing != observed.enhanced_routing
}

/// True when the observed modify-class and logging state matches `desired`.
///
/// Used by the final verification step: after the pipeline completes, the
/// remote snapshot is the source of truth and any divergence here is a
/// reconciliation failure, not something to paper over.
pub fn converged(desired: &ResourceConfig, observed: &StatusSnapshot) -> bool {
    observed.node_type == desired.node_type
        && observed.node_count == desired.node_count
        && observed.logging_enabled == desired.logging.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResourceId, ResourceStatus};

    fn config() -> ResourceConfig {
        ResourceConfig {
            id: ResourceId::from("analytics-main"),
            node_type: "dc2.large".to_string(),
            node_count: 2,
            maintenance_window: None,
            tags: vec![],
            roles: vec![],
            logging: None,
            parameter_group: Some("pg-v1".to_string()),
            maintenance_track: None,
            enhanced_routing: false,
        }
    }

    fn snapshot_of(config: &ResourceConfig) -> StatusSnapshot {
        StatusSnapshot {
            status: ResourceStatus::Available,
            node_type: config.node_type.clone(),
            node_count: config.node_count,
            logging_enabled: config.logging.is_some(),
            parameter_group: config.parameter_group.clone(),
            maintenance_track: config.maintenance_track.clone(),
            enhanced_routing: config.enhanced_routing,
        }
    }

    #[test]
    fn identical_configs_need_no_modify() {
        let prior = config();
        assert!(!modify_pending(&prior, &prior.clone()));
    }

    #[test]
    fn node_count_change_needs_modify() {
        let prior = config();
        let mut desired = config();
        desired.node_count = 4;
        assert!(modify_pending(&prior, &desired));
    }

    #[test]
    fn reboot_class_change_does_not_need_modify() {
        let prior = config();
        let mut desired = config();
        desired.parameter_group = Some("pg-v2".to_string());
        desired.enhanced_routing = true;
        assert!(!modify_pending(&prior, &desired));
    }

    #[test]
    fn reboot_required_only_for_allow_list_fields() {
        let target = config();
        let mut observed = snapshot_of(&target);
        assert!(!reboot_required(&target, &observed));

        // Modify-class divergence alone never demands a restart.
        observed.node_count = 16;
        assert!(!reboot_required(&target, &observed));

        observed.parameter_group = Some("pg-v0".to_string());
        assert!(reboot_required(&target, &observed));
    }

    #[test]
    fn converged_checks_modify_class_and_logging() {
        let desired = config();
        let mut observed = snapshot_of(&desired);
        assert!(converged(&desired, &observed));

        observed.logging_enabled = true;
        assert!(!converged(&desired, &observed));

        observed.logging_enabled = false;
        observed.node_type = "dc2.8xlarge".to_string();
        assert!(!converged(&desired, &observed));
    }
}
