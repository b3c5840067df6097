//! # Handle Registry
//!
//! Lifecycle bookkeeping for native resources owned by Rust wrapper objects.
//!
//! Every wrapper (term manager, solver, term, sort, ...) holds one native
//! handle that must be freed exactly once, and dependents must be freed before
//! the handles they depend on. A [`HandleRegistry`] tracks the live wrappers of
//! one execution context and tears them down in reverse registration order.
//!
//! ## Quick Start
//!
//! ```rust
//! use handle_registry::{current_thread, HandleId, HandleSlot, NativeError, NativeWrapper};
//! use std::rc::Rc;
//!
//! struct Sort {
//!     slot: HandleSlot,
//! }
//!
//! impl NativeWrapper for Sort {
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
//! let sort = Rc::new(Sort { slot: HandleSlot::new(HandleId::new(0x10).unwrap()) });
//! current_thread::register(sort.clone());
//!
//! // At thread teardown
//! assert_eq!(current_thread::release_all().unwrap(), 1);
//! assert_eq!(sort.identity(), None);
//! ```
//!
//! ## Features
//!
//! - **Per-context**: explicit [`HandleRegistry`] values, or thread contexts generated
//!   by [`define_context!`]; contexts never share state
//! - **Ordered teardown**: bulk release runs newest-first
//! - **Idempotent**: duplicate registration and redundant unregistration are no-ops
//! - **Tracing support**: optional callback plus `tracing` events for every operation
//!
//! ## Main Items
//!
//! - [`HandleRegistry`] - Explicit, context-owned registry
//! - [`NativeWrapper`] - Capability contract wrappers implement
//! - [`HandleId`] - Non-null native handle identity
//! - [`current_thread`] - Built-in thread context
//! - [`define_context!`] - Generate additional thread contexts

#[macro_use]
mod macros;

mod handle;
mod ledger;
mod options;
mod registry;
mod registry_error;
mod registry_event;
mod sweep;
mod wrapper;

pub use handle::HandleId;
pub use ledger::WrapperRef;
pub use options::RegistryOptions;
pub use registry::{HandleRegistry, TraceCallback};
pub use registry_error::{RegistryError, ReleaseReport};
pub use registry_event::RegistryEvent;
pub use sweep::{Interrupted, Sweep};
pub use wrapper::{HandleSlot, NativeError, NativeWrapper};

#[doc(hidden)]
pub use sweep::release_detached;

define_context!(
    /// Handle context of the calling thread.
    ///
    /// Each thread that uses this module gets its own registry. Call
    /// [`current_thread::release_all`] once all wrappers created on a thread
    /// are no longer needed, before the thread exits.
    current_thread
);
