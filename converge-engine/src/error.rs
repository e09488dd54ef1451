//! Error types for converge-engine.
//!
//! Collaborator failures arrive as explicit [`RemoteError`] values, never as
//! re-thrown exceptions, and classify into exactly three kinds:
//!
//! - [`ErrorKind::InvalidRequest`] — malformed input, a resource state that
//!   rejects the operation, a quota/limit hit, an unsupported option.
//! - [`ErrorKind::NotFound`] — the target or a referenced sub-resource does
//!   not exist; carries the missing identifier.
//! - [`ErrorKind::Service`] — transport/client failure or an unclassified
//!   remote fault. Terminal for this attempt, but the whole reconciliation
//!   may safely be re-run from the top since every step is idempotent.

use std::fmt;

use thiserror::Error;

use converge_core::ValidationError;

/// Classification surfaced to the invoking harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Service,
}

impl ErrorKind {
    /// Whether re-attempting the whole reconciliation from the top may
    /// succeed without any input change.
    pub fn is_retriable(self) -> bool {
        matches!(self, ErrorKind::Service)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidRequest => "invalid-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Service => "service-error",
        };
        f.write_str(s)
    }
}

/// A classified failure returned by a collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote side rejected the request as invalid.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The target (or a referenced sub-resource) does not exist.
    #[error("not found: {id}")]
    NotFound { id: String },

    /// Transport/client failure or unclassified remote fault.
    #[error("remote service failure: {reason}")]
    Service { reason: String },
}

impl RemoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RemoteError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            RemoteError::NotFound { .. } => ErrorKind::NotFound,
            RemoteError::Service { .. } => ErrorKind::Service,
        }
    }
}

/// A terminal reconciliation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A collaborator call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The desired configuration failed local validation.
    #[error("invalid desired configuration: {0}")]
    Validation(#[from] ValidationError),

    /// The final state read does not match the just-applied desired state.
    /// The remote snapshot is the source of truth; divergence is surfaced
    /// instead of trusted away.
    #[error("remote state for {id} diverged after apply: {detail}")]
    Diverged { id: String, detail: String },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Remote(remote) => remote.kind(),
            EngineError::Validation(_) => ErrorKind::InvalidRequest,
            // Safe to re-attempt: a fresh run re-reads and re-applies.
            EngineError::Diverged { .. } => ErrorKind::Service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_classify_into_three_kinds() {
        let invalid = RemoteError::InvalidRequest {
            reason: "tag limit exceeded".to_string(),
        };
        let missing = RemoteError::NotFound {
            id: "analytics-main".to_string(),
        };
        let service = RemoteError::Service {
            reason: "connection reset".to_string(),
        };
        assert_eq!(invalid.kind(), ErrorKind::InvalidRequest);
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(service.kind(), ErrorKind::Service);
    }

    #[test]
    fn only_service_kind_is_retriable() {
        assert!(ErrorKind::Service.is_retriable());
        assert!(!ErrorKind::InvalidRequest.is_retriable());
        assert!(!ErrorKind::NotFound.is_retriable());
    }

    #[test]
    fn divergence_maps_to_retriable_service_kind() {
        let err = EngineError::Diverged {
            id: "analytics-main".to_string(),
            detail: "node_count 2 != desired 4".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Service);
        assert!(err.kind().is_retriable());
    }

    #[test]
    fn validation_maps_to_invalid_request() {
        let err = EngineError::Validation(ValidationError::ZeroNodeCount);
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
