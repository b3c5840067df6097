use std::fmt;

use crate::HandleId;

/// Events emitted by a handle registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use handle_registry::{HandleId, RegistryEvent};
///
/// let event = RegistryEvent::Register {
///     handle: HandleId::new(16).unwrap(),
///     kind: "Solver",
///     inserted: true,
/// };
/// assert_eq!(
///     event.to_string(),
///     "register { handle: 0x10, kind: Solver, inserted: true }"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A wrapper was offered for registration.
    Register {
        handle: HandleId,
        kind: &'static str,
        /// `false` when the identity was already registered.
        inserted: bool,
    },

    /// A wrapper asked to be removed from the registry.
    Unregister {
        /// `None` when the wrapper had already released its handle.
        handle: Option<HandleId>,
        kind: &'static str,
        /// Whether an entry was actually removed.
        removed: bool,
    },

    /// A wrapper's native resource was released by the registry.
    Release {
        handle: HandleId,
        kind: &'static str,
        /// Whether `release_native` succeeded.
        ok: bool,
    },

    /// A bulk release finished or was interrupted.
    ReleaseAll {
        released: usize,
        failed: usize,
        /// Entries left registered because the sweep stopped early.
        remaining: usize,
    },

    /// A registry was dropped while still holding live handles.
    Leak { live: usize },
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Register {
                handle,
                kind,
                inserted,
            } => write!(
                f,
                "register {{ handle: {handle}, kind: {kind}, inserted: {inserted} }}"
            ),
            RegistryEvent::Unregister {
                handle: Some(handle),
                kind,
                removed,
            } => write!(
                f,
                "unregister {{ handle: {handle}, kind: {kind}, removed: {removed} }}"
            ),
            RegistryEvent::Unregister {
                handle: None,
                kind,
                removed,
            } => write!(
                f,
                "unregister {{ handle: null, kind: {kind}, removed: {removed} }}"
            ),
            RegistryEvent::Release { handle, kind, ok } => {
                write!(f, "release {{ handle: {handle}, kind: {kind}, ok: {ok} }}")
            }
            RegistryEvent::ReleaseAll {
                released,
                failed,
                remaining,
            } => write!(
                f,
                "release_all {{ released: {released}, failed: {failed}, remaining: {remaining} }}"
            ),
            RegistryEvent::Leak { live } => write!(f, "leak {{ live: {live} }}"),
        }
    }
}
