//! Stabilization polling.
//!
//! After every mutating call the orchestrator waits for the resource to
//! return to its steady status before the next step may run. The engine
//! never blocks: one sample per invocation, and a not-yet-stable result
//! becomes an `IN_PROGRESS` outcome asking the harness to re-invoke after
//! [`STABILIZE_DELAY_SECONDS`].

use converge_core::ResourceId;

use crate::error::RemoteError;
use crate::remote::RemoteApi;

/// Delay the harness should wait before re-polling a stabilizing resource.
pub const STABILIZE_DELAY_SECONDS: u64 = 30;

/// Take one status sample; `true` iff the resource is back in its steady
/// state.
///
/// A recently-mutated resource may transiently report `NotFound` before it
/// becomes visible again; that is "not yet stable", never an error.
pub fn poll<R: RemoteApi>(remote: &mut R, id: &ResourceId) -> Result<bool, RemoteError> {
    match remote.read_status(id) {
        Ok(snapshot) => {
            if !snapshot.is_steady() {
                tracing::debug!(resource = %id, status = %snapshot.status, "not yet stable");
            }
            Ok(snapshot.is_steady())
        }
        Err(RemoteError::NotFound { .. }) => {
            tracing::debug!(resource = %id, "transiently not visible, treating as stabilizing");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
