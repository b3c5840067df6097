use thiserror::Error;

use crate::{HandleId, NativeError};

/// Errors surfaced by registry release operations.
///
/// Registration and unregistration never fail; only the native deallocation
/// performed by a wrapper can, and that failure is handed back to whoever
/// asked for the release.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to release native handle {handle} ({kind})")]
    Release {
        handle: HandleId,
        kind: &'static str,
        #[source]
        source: NativeError,
    },
}

impl RegistryError {
    /// The handle whose release failed.
    pub fn handle(&self) -> HandleId {
        match self {
            RegistryError::Release { handle, .. } => *handle,
        }
    }
}

/// Outcome of a bulk release that keeps going past failures.
#[derive(Debug, Default)]
pub struct ReleaseReport {
    /// Handles whose `release_native` succeeded.
    pub released: usize,
    /// One error per handle whose `release_native` failed, in release order.
    pub failures: Vec<RegistryError>,
}

impl ReleaseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts the report into a `Result`, yielding the first failure.
    pub fn into_result(self) -> Result<usize, RegistryError> {
        match self.failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.released),
        }
    }
}
