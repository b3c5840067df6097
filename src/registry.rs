//! The per-context handle registry.
//!
//! A [`HandleRegistry`] records which wrappers currently own a live native
//! handle and tears them down in reverse registration order. It is owned by
//! exactly one logical execution context and is never shared: it holds `Rc`s,
//! so it is neither `Send` nor `Sync`.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//! use handle_registry::{HandleId, HandleRegistry, HandleSlot, NativeError, NativeWrapper};
//!
//! struct Solver {
//!     slot: HandleSlot,
//! }
//!
//! impl NativeWrapper for Solver {
//!     fn identity(&self) -> Option<HandleId> {
//!         self.slot.get()
//!     }
//!
//!     fn release_native(&self) -> Result<(), NativeError> {
//!         self.slot.take();
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = HandleRegistry::new();
//! let solver = Rc::new(Solver { slot: HandleSlot::new(HandleId::new(1).unwrap()) });
//! registry.register(solver.clone());
//!
//! assert_eq!(registry.release_all().unwrap(), 1);
//! assert!(registry.is_empty());
//! assert_eq!(solver.identity(), None);
//! ```

use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::ledger::{Ledger, WrapperRef};
use crate::sweep::{release_detached, Sweep};
use crate::{HandleId, NativeWrapper, RegistryError, RegistryEvent, RegistryOptions, ReleaseReport};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. Registries are single-context, so the callback need not be `Send`.
pub type TraceCallback = dyn Fn(&RegistryEvent) + 'static;

/// Lifecycle registry for the native handles of one execution context.
pub struct HandleRegistry {
    ledger: Ledger,
    options: RegistryOptions,
    trace: Option<Rc<TraceCallback>>,
}

impl HandleRegistry {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            ledger: Ledger::with_capacity(options.capacity),
            options,
            trace: None,
        }
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Sets a tracing callback that will be invoked on every registry interaction.
    ///
    /// The callback must not call back into this registry.
    pub fn set_trace_callback(&mut self, callback: impl Fn(&RegistryEvent) + 'static) {
        self.trace = Some(Rc::new(callback));
    }

    /// Clears the tracing callback (disables registry tracing).
    pub fn clear_trace_callback(&mut self) {
        self.trace = None;
    }

    /// Invokes the tracing callback, if any, with `event`.
    pub fn emit_event(&self, event: &RegistryEvent) {
        if let Some(callback) = self.trace.as_ref() {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    /// Records `wrapper` as the owner of its current handle.
    ///
    /// Registering an identity that is already present is a no-op; the first
    /// registration keeps its place in the teardown order. A wrapper without a
    /// handle is ignored.
    pub fn register(&mut self, wrapper: WrapperRef) {
        let kind = wrapper.kind();
        let Some(handle) = wrapper.identity() else {
            tracing::debug!(kind, "ignoring registration of a wrapper without a native handle");
            return;
        };

        let inserted = self.ledger.insert(handle, wrapper);
        tracing::trace!(%handle, kind, inserted, "register native handle");
        self.emit_event(&RegistryEvent::Register {
            handle,
            kind,
            inserted,
        });
    }

    /// Removes `wrapper`'s entry so the next bulk release skips it.
    ///
    /// A wrapper that already released its handle, or an identity that is not
    /// registered, makes this a no-op. Returns whether an entry was removed.
    pub fn unregister(&mut self, wrapper: &dyn NativeWrapper) -> bool {
        let handle = wrapper.identity();
        let removed = handle
            .and_then(|handle| self.ledger.remove(handle))
            .is_some();

        let kind = wrapper.kind();
        tracing::trace!(handle = ?handle, kind, removed, "unregister native handle");
        self.emit_event(&RegistryEvent::Unregister {
            handle,
            kind,
            removed,
        });
        removed
    }

    /// Individually releases `wrapper`: unregisters it, then frees its native
    /// resource.
    ///
    /// Returns `Ok(false)` without touching the wrapper if it holds no handle.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Release`] if the wrapper's native release fails. The
    /// entry has already been removed at that point.
    pub fn release(&mut self, wrapper: &dyn NativeWrapper) -> Result<bool, RegistryError> {
        self.unregister(wrapper);
        release_detached(wrapper, |event| self.emit_event(event))
    }

    /// Releases every registered handle, most recently registered first, and
    /// leaves the registry empty.
    ///
    /// Returns the number of handles released. Calling it again on an empty
    /// registry releases nothing and succeeds.
    ///
    /// # Errors
    ///
    /// Stops at the first failing native release and returns it. The failed
    /// handle is not retried; older entries stay registered in their original
    /// order, so calling `release_all` again resumes the teardown.
    pub fn release_all(&mut self) -> Result<usize, RegistryError> {
        let sweep = self.take_sweep();
        match sweep.run(|event| self.emit_event(event)) {
            Ok(released) => Ok(released),
            Err(interrupted) => {
                self.restore(interrupted.remaining);
                Err(interrupted.error)
            }
        }
    }

    /// Releases every registered handle like [`release_all`](Self::release_all),
    /// but keeps going past failures and reports all of them.
    pub fn release_all_collect(&mut self) -> ReleaseReport {
        let sweep = self.take_sweep();
        sweep.run_to_end(|event| self.emit_event(event))
    }

    /// Detaches every entry for release, leaving the registry empty.
    ///
    /// Wrappers registered while the sweep runs land in the registry again and
    /// are left for the next teardown.
    pub fn take_sweep(&mut self) -> Sweep {
        Sweep::new(mem::take(&mut self.ledger))
    }

    /// Hands the unvisited entries of an interrupted sweep back to the
    /// registry, ahead of anything registered since the sweep started.
    pub fn restore(&mut self, remaining: Sweep) {
        let later = mem::replace(&mut self.ledger, remaining.into_ledger());
        self.ledger.append(later);
    }

    pub fn contains(&self, handle: HandleId) -> bool {
        self.ledger.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Registered identities in registration order.
    pub fn handles(&self) -> impl Iterator<Item = HandleId> + '_ {
        self.ledger.ids()
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("handles", &self.ledger)
            .field("options", &self.options)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

impl Drop for HandleRegistry {
    fn drop(&mut self) {
        if !self.options.leak_check || self.ledger.is_empty() {
            return;
        }
        let live = self.ledger.len();
        tracing::warn!(
            live,
            handles = ?self.ledger,
            "handle registry dropped with live native handles; call release_all before the context ends"
        );
        self.emit_event(&RegistryEvent::Leak { live });
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
