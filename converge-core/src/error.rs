//! Error types for converge-core.

use thiserror::Error;

use crate::types::ResourceConfig;

/// Local validation failures on a desired configuration — caught before any
/// remote call is issued.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty resource identifier.
    #[error("resource identifier must not be empty")]
    EmptyIdentifier,

    /// Node count of zero is never a valid topology.
    #[error("node count must be at least 1")]
    ZeroNodeCount,

    /// Logging enabled but no destination bucket given.
    #[error("logging configuration requires a non-empty bucket")]
    EmptyLoggingBucket,

    /// A tag with an empty key can neither be created nor deleted remotely.
    #[error("tag keys must not be empty")]
    EmptyTagKey,
}

impl ResourceConfig {
    /// Validate the invariants the remote service would reject anyway, so a
    /// malformed desired state fails fast and locally.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.0.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }
        if self.node_count == 0 {
            return Err(ValidationError::ZeroNodeCount);
        }
        if let Some(logging) = &self.logging {
            if logging.bucket.trim().is_empty() {
                return Err(ValidationError::EmptyLoggingBucket);
            }
        }
        if self.tags.iter().any(|t| t.key.trim().is_empty()) {
            return Err(ValidationError::EmptyTagKey);
        }
        Ok(())
    }
}
