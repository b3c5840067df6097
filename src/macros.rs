//! Macros for creating thread-scoped handle contexts.
//!
//! This module provides a macro-based approach to create per-thread handle
//! registries: every thread that touches the generated module gets its own
//! [`HandleRegistry`](crate::HandleRegistry), and no thread can observe or
//! mutate another thread's entries.

/// Creates a thread-scoped handle context with a single macro invocation.
///
/// The macro generates a module containing:
/// - A thread-local `HandleRegistry` (hidden)
/// - Free functions delegating to the calling thread's registry
///
/// An optional second argument sets the [`RegistryOptions`](crate::RegistryOptions)
/// each thread's registry is built with.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use handle_registry::{define_context, HandleId, HandleSlot, NativeError, NativeWrapper};
///
/// define_context!(solver_thread);
///
/// struct TermManager {
///     slot: HandleSlot,
/// }
///
/// impl NativeWrapper for TermManager {
///     fn identity(&self) -> Option<HandleId> {
///         self.slot.get()
///     }
///
///     fn release_native(&self) -> Result<(), NativeError> {
///         self.slot.take();
///         Ok(())
///     }
/// }
///
/// let tm = Rc::new(TermManager { slot: HandleSlot::new(HandleId::new(1).unwrap()) });
/// solver_thread::register(tm.clone());
/// assert_eq!(solver_thread::len(), 1);
///
/// solver_thread::release_all().unwrap();
/// assert!(solver_thread::is_empty());
/// ```
///
/// # Re-entrancy
///
/// `release` and `release_all` run every `release_native` call outside the
/// thread-local borrow, so a wrapper may unregister itself through the same
/// module while it is being released. Trace callbacks, on the other hand, run
/// while the registry is borrowed and must not call back into the module.
#[macro_export]
macro_rules! define_context {
    ($(#[$meta:meta])* $name:ident) => {
        $crate::define_context!($(#[$meta])* $name, $crate::RegistryOptions::new());
    };
    ($(#[$meta:meta])* $name:ident, $options:expr) => {
        $(#[$meta])*
        pub mod $name {
            use std::cell::RefCell;

            use $crate::{
                HandleId, HandleRegistry, NativeWrapper, RegistryError, RegistryEvent,
                ReleaseReport, WrapperRef,
            };
            #[allow(unused_imports)]
            use $crate::RegistryOptions;

            thread_local! {
                // Calling thread's registry (module-private)
                static REGISTRY: RefCell<HandleRegistry> =
                    RefCell::new(HandleRegistry::with_options($options));
            }

            /// Register a wrapper in the calling thread's context.
            pub fn register(wrapper: WrapperRef) {
                REGISTRY.with_borrow_mut(|registry| registry.register(wrapper))
            }

            /// Unregister a wrapper from the calling thread's context.
            pub fn unregister(wrapper: &dyn NativeWrapper) -> bool {
                REGISTRY.with_borrow_mut(|registry| registry.unregister(wrapper))
            }

            /// Unregister a wrapper, then release its native resource.
            pub fn release(wrapper: &dyn NativeWrapper) -> Result<bool, RegistryError> {
                unregister(wrapper);
                $crate::release_detached(wrapper, emit_event)
            }

            /// Release every handle registered by the calling thread, newest first.
            pub fn release_all() -> Result<usize, RegistryError> {
                let sweep = REGISTRY.with_borrow_mut(HandleRegistry::take_sweep);
                sweep.run(emit_event).map_err(|interrupted| {
                    REGISTRY.with_borrow_mut(|registry| registry.restore(interrupted.remaining));
                    interrupted.error
                })
            }

            /// Like `release_all`, but keeps going past failures.
            pub fn release_all_collect() -> ReleaseReport {
                let sweep = REGISTRY.with_borrow_mut(HandleRegistry::take_sweep);
                sweep.run_to_end(emit_event)
            }

            /// Check whether a handle is registered in the calling thread's context.
            pub fn contains(handle: HandleId) -> bool {
                REGISTRY.with_borrow(|registry| registry.contains(handle))
            }

            pub fn len() -> usize {
                REGISTRY.with_borrow(HandleRegistry::len)
            }

            pub fn is_empty() -> bool {
                REGISTRY.with_borrow(HandleRegistry::is_empty)
            }

            /// Registered identities of the calling thread, in registration order.
            pub fn handles() -> Vec<HandleId> {
                REGISTRY.with_borrow(|registry| registry.handles().collect())
            }

            /// Set a tracing callback for the calling thread's registry.
            pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + 'static) {
                REGISTRY.with_borrow_mut(|registry| registry.set_trace_callback(callback))
            }

            /// Clear the calling thread's tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.with_borrow_mut(HandleRegistry::clear_trace_callback)
            }

            /// Run `f` with exclusive access to the calling thread's registry.
            ///
            /// `f` must not call other functions of this module.
            pub fn with<R>(f: impl FnOnce(&mut HandleRegistry) -> R) -> R {
                REGISTRY.with_borrow_mut(f)
            }

            fn emit_event(event: &RegistryEvent) {
                REGISTRY.with_borrow(|registry| registry.emit_event(event))
            }
        }
    };
}
