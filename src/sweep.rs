//! Bulk teardown of a detached set of registry entries.
//!
//! A [`Sweep`] owns the entries it is about to release, so no registry borrow
//! is held while wrappers run their native deallocation. A wrapper may call
//! back into its registry (to unregister itself, or to register something new)
//! from inside `release_native` without disturbing the sweep.

use crate::ledger::{Ledger, WrapperRef};
use crate::{HandleId, NativeWrapper, RegistryError, RegistryEvent, ReleaseReport};

/// Entries detached from a registry for release, newest first.
///
/// Obtained from [`HandleRegistry::take_sweep`](crate::HandleRegistry::take_sweep).
#[derive(Debug)]
#[must_use = "a sweep releases nothing until it is run"]
pub struct Sweep {
    ledger: Ledger,
}

/// A sweep stopped by a failing native release.
#[derive(Debug)]
pub struct Interrupted {
    /// The failure that stopped the sweep.
    pub error: RegistryError,
    /// Handles released before the failure.
    pub released: usize,
    /// Older entries that were never visited; hand them back to the registry
    /// with [`HandleRegistry::restore`](crate::HandleRegistry::restore).
    pub remaining: Sweep,
}

impl Sweep {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub(crate) fn into_ledger(self) -> Ledger {
        self.ledger
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Identities still pending, in the order they will be released.
    pub fn pending(&self) -> impl Iterator<Item = HandleId> + '_ {
        self.ledger.ids().rev()
    }

    /// Pops the newest entry whose wrapper still holds the registered handle.
    ///
    /// Entries released behind the sweep's back (individually, from inside
    /// another wrapper's `release_native`, or directly) are dropped unvisited.
    fn pop_live(&mut self) -> Option<(HandleId, WrapperRef)> {
        while let Some((handle, wrapper)) = self.ledger.pop_latest() {
            if wrapper.identity() == Some(handle) {
                return Some((handle, wrapper));
            }
            tracing::trace!(%handle, kind = wrapper.kind(), "skipping already released handle");
        }
        None
    }

    /// Releases every entry in reverse registration order, stopping at the
    /// first failure.
    ///
    /// The failing entry is consumed: its `release_native` has been attempted
    /// and will not be called again by the registry.
    pub fn run(mut self, mut on_event: impl FnMut(&RegistryEvent)) -> Result<usize, Interrupted> {
        let mut released = 0;

        while let Some((handle, wrapper)) = self.pop_live() {
            let kind = wrapper.kind();
            let outcome = wrapper.release_native();
            on_event(&RegistryEvent::Release {
                handle,
                kind,
                ok: outcome.is_ok(),
            });

            if let Err(source) = outcome {
                let remaining = self.len();
                on_event(&RegistryEvent::ReleaseAll {
                    released,
                    failed: 1,
                    remaining,
                });
                tracing::debug!(
                    %handle,
                    kind,
                    released,
                    remaining,
                    "native release failed, sweep interrupted"
                );
                return Err(Interrupted {
                    error: RegistryError::Release {
                        handle,
                        kind,
                        source,
                    },
                    released,
                    remaining: self,
                });
            }
            released += 1;
        }

        on_event(&RegistryEvent::ReleaseAll {
            released,
            failed: 0,
            remaining: 0,
        });
        tracing::debug!(released, "released all native handles");
        Ok(released)
    }

    /// Releases every entry in reverse registration order, continuing past
    /// failures.
    pub fn run_to_end(mut self, mut on_event: impl FnMut(&RegistryEvent)) -> ReleaseReport {
        let mut report = ReleaseReport::default();

        while let Some((handle, wrapper)) = self.pop_live() {
            let kind = wrapper.kind();
            let outcome = wrapper.release_native();
            on_event(&RegistryEvent::Release {
                handle,
                kind,
                ok: outcome.is_ok(),
            });

            match outcome {
                Ok(()) => report.released += 1,
                Err(source) => report.failures.push(RegistryError::Release {
                    handle,
                    kind,
                    source,
                }),
            }
        }

        on_event(&RegistryEvent::ReleaseAll {
            released: report.released,
            failed: report.failures.len(),
            remaining: 0,
        });
        tracing::debug!(
            released = report.released,
            failed = report.failures.len(),
            "released all native handles"
        );
        report
    }
}

/// Releases one wrapper that has already been removed from its registry.
///
/// Returns `Ok(false)` when the wrapper no longer holds a handle.
#[doc(hidden)]
pub fn release_detached(
    wrapper: &dyn NativeWrapper,
    on_event: impl FnOnce(&RegistryEvent),
) -> Result<bool, RegistryError> {
    let Some(handle) = wrapper.identity() else {
        return Ok(false);
    };
    let kind = wrapper.kind();
    let outcome = wrapper.release_native();
    on_event(&RegistryEvent::Release {
        handle,
        kind,
        ok: outcome.is_ok(),
    });
    outcome
        .map(|()| true)
        .map_err(|source| RegistryError::Release {
            handle,
            kind,
            source,
        })
}
