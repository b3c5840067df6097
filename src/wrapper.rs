//! The capability contract between wrapper objects and the registry.

use std::cell::Cell;
use std::error::Error;

use crate::HandleId;

/// Error returned by a wrapper's native deallocation.
pub type NativeError = Box<dyn Error + Send + Sync + 'static>;

/// A Rust-side object that owns exactly one native resource.
///
/// Term managers, solvers, terms, sorts and every other wrapper kind implement
/// this trait so a [`HandleRegistry`](crate::HandleRegistry) can track and tear
/// them down uniformly.
///
/// # Contract
///
/// - [`identity`](Self::identity) returns `Some` while the native resource is
///   live and `None` once it has been released.
/// - [`release_native`](Self::release_native) frees the native resource and
///   flips the identity to `None` before returning, so a later
///   `unregister` is a no-op. It does not need to be idempotent: the registry
///   calls it at most once per handle it tracks.
///
/// Methods take `&self`; wrappers store their handle in a [`HandleSlot`] (or
/// another `Cell`) so a shared `Rc` can still release it.
///
/// # Examples
///
/// ```rust
/// use handle_registry::{HandleId, HandleSlot, NativeError, NativeWrapper};
///
/// struct Sort {
///     slot: HandleSlot,
/// }
///
/// impl NativeWrapper for Sort {
///     fn identity(&self) -> Option<HandleId> {
///         self.slot.get()
///     }
///
///     fn release_native(&self) -> Result<(), NativeError> {
///         if let Some(_id) = self.slot.take() {
///             // native_sort_delete(_id.get());
///         }
///         Ok(())
///     }
/// }
///
/// let sort = Sort { slot: HandleSlot::new(HandleId::new(9).unwrap()) };
/// sort.release_native().unwrap();
/// assert_eq!(sort.identity(), None);
/// ```
pub trait NativeWrapper {
    /// Current handle identity, or `None` after release.
    fn identity(&self) -> Option<HandleId>;

    /// Performs the one-time native deallocation.
    fn release_native(&self) -> Result<(), NativeError>;

    /// Wrapper kind reported in events, logs and errors.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Interior-mutable storage for a wrapper's handle identity.
///
/// `take` clears the slot and hands back the identity exactly once, which is
/// the usual first step of a `release_native` implementation.
#[derive(Debug, Default)]
pub struct HandleSlot(Cell<Option<HandleId>>);

impl HandleSlot {
    pub const fn new(id: HandleId) -> Self {
        Self(Cell::new(Some(id)))
    }

    /// A slot with no native resource attached.
    pub const fn empty() -> Self {
        Self(Cell::new(None))
    }

    pub fn get(&self) -> Option<HandleId> {
        self.0.get()
    }

    /// Clears the slot, returning the identity it held.
    pub fn take(&self) -> Option<HandleId> {
        self.0.take()
    }

    /// Attaches a new identity, returning the previous one.
    pub fn replace(&self, id: Option<HandleId>) -> Option<HandleId> {
        self.0.replace(id)
    }

    pub fn is_live(&self) -> bool {
        self.0.get().is_some()
    }
}

impl From<Option<HandleId>> for HandleSlot {
    fn from(id: Option<HandleId>) -> Self {
        Self(Cell::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Term {
        slot: HandleSlot,
        fail: bool,
    }

    impl NativeWrapper for Term {
        fn identity(&self) -> Option<HandleId> {
            self.slot.get()
        }

        fn release_native(&self) -> Result<(), NativeError> {
            self.slot.take();
            if self.fail {
                return Err("native delete failed".into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_slot_take_only_once() {
        let slot = HandleSlot::new(HandleId::new(3).unwrap());
        assert!(slot.is_live());
        assert_eq!(slot.take(), HandleId::new(3));
        assert_eq!(slot.take(), None);
        assert!(!slot.is_live());
    }

    #[test]
    fn test_slot_replace() {
        let slot = HandleSlot::empty();
        assert_eq!(slot.replace(HandleId::new(8)), None);
        assert_eq!(slot.get(), HandleId::new(8));
    }

    #[test]
    fn test_default_kind_is_type_name() {
        let term = Term {
            slot: HandleSlot::empty(),
            fail: false,
        };
        assert!(term.kind().ends_with("Term"));
    }

    #[test]
    fn test_release_clears_identity_even_on_error() {
        let term = Term {
            slot: HandleSlot::new(HandleId::new(1).unwrap()),
            fail: true,
        };
        let err = term.release_native().unwrap_err();
        assert_eq!(err.to_string(), "native delete failed");
        assert_eq!(term.identity(), None);
    }
}
