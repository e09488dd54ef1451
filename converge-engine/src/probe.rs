//! Existence probe — gates entry to the pipeline.

use converge_core::ResourceId;

use crate::error::RemoteError;
use crate::remote::RemoteApi;

/// Whether the resource currently exists remotely.
///
/// A `NotFound` from the collaborator is the expected "does not exist"
/// signal and maps to `Ok(false)`; any other failure propagates.
pub fn exists<R: RemoteApi>(remote: &mut R, id: &ResourceId) -> Result<bool, RemoteError> {
    match remote.probe_exists(id) {
        Ok(found) => Ok(found),
        Err(RemoteError::NotFound { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}
