//! Domain types for the converge reconciliation model.
//!
//! `ResourceConfig` is the full shape of both the desired and the
//! previously-applied ("prior") configuration; `StatusSnapshot` is what a
//! status read of the live remote resource returns. All types are
//! serializable via serde so the CLI can load them from YAML and persist
//! workflow context as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed stable identifier for the remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub String);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// An opaque role-attachment identifier (an ARN-like string).
///
/// Identity for diffing purposes is the full string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleArn(pub String);

impl fmt::Display for RoleArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RoleArn {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoleArn {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// A key/value tag. Identity is the key; equality requires both key and
/// value to match, so a value change diffs as remove-old + add-new.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Destination for remote audit-log delivery. `None` on a config means
/// logging is (to be) disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,
}

// ---------------------------------------------------------------------------
// Resource configuration
// ---------------------------------------------------------------------------

/// Full configuration of the remote resource.
///
/// Serves as both the desired state (the target of a reconciliation) and the
/// prior state (what was last successfully applied). Immutable for the
/// duration of one reconciliation attempt.
///
/// Fields fall into classes the orchestrator treats differently:
/// - diffed collections: `tags`, `roles`
/// - the logging toggle: `logging`
/// - modify-class (applied by `modify_config`, effective immediately):
///   `node_type`, `node_count`, `maintenance_window`
/// - reboot-class (staged remotely, effective only after an explicit
///   restart): `parameter_group`, `maintenance_track`, `enhanced_routing`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub id: ResourceId,
    pub node_type: String,
    pub node_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_window: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub roles: Vec<RoleArn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_track: Option<String>,
    #[serde(default)]
    pub enhanced_routing: bool,
}

// ---------------------------------------------------------------------------
// Remote status
// ---------------------------------------------------------------------------

/// Lifecycle status reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceStatus {
    /// Steady state — the only status mutations may be issued against.
    Available,
    /// A configuration change is being applied.
    Modifying,
    /// A restart is in progress.
    Rebooting,
    /// Unreachable or in a degraded state.
    Unavailable,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceStatus::Available => "available",
            ResourceStatus::Modifying => "modifying",
            ResourceStatus::Rebooting => "rebooting",
            ResourceStatus::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Point-in-time observation of the live remote resource.
///
/// Reboot-class fields here are the *effective* values; a divergence from
/// the desired config on those fields means a restart is still needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
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
}

impl StatusSnapshot {
    /// Whether the resource is in its steady, mutation-accepting state.
    pub fn is_steady(&self) -> bool {
        self.status == ResourceStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_equality_requires_key_and_value() {
        assert_eq!(Tag::new("env", "prod"), Tag::new("env", "prod"));
        assert_ne!(Tag::new("env", "prod"), Tag::new("env", "dev"));
        assert_ne!(Tag::new("env", "prod"), Tag::new("team", "prod"));
    }

    #[test]
    fn resource_config_yaml_round_trip() {
        let config = ResourceConfig {
            id: ResourceId::from("analytics-main"),
            node_type: "dc2.large".to_string(),
            node_count: 4,
            maintenance_window: Some("sun:05:00-sun:05:30".to_string()),
            tags: vec![Tag::new("env", "prod")],
            roles: vec![RoleArn::from("arn:aws:iam::123:role/loader")],
            logging: Some(LoggingConfig {
                bucket: "audit-logs".to_string(),
                key_prefix: None,
            }),
            parameter_group: Some("pg-v2".to_string()),
            maintenance_track: None,
            enhanced_routing: false,
        };
        let yaml = serde_yaml::to_string(&config).expect("serialize");
        let back: ResourceConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(back, config);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&ResourceStatus::Available).expect("serialize");
        assert_eq!(json, "\"available\"");
        assert_eq!(ResourceStatus::Rebooting.to_string(), "rebooting");
    }

    #[test]
    fn snapshot_steady_only_when_available() {
        let mut snapshot = StatusSnapshot {
            status: ResourceStatus::Available,
            node_type: "dc2.large".to_string(),
            node_count: 2,
            logging_enabled: false,
            parameter_group: None,
            maintenance_track: None,
            enhanced_routing: false,
        };
        assert!(snapshot.is_steady());
        snapshot.status = ResourceStatus::Modifying;
        assert!(!snapshot.is_steady());
    }
}
