//! Strongly typed native handle identities.

use std::fmt;
use std::num::NonZeroU64;

/// Identity of one live native resource.
///
/// A handle is never zero: the "no resource attached" state is expressed as
/// `Option::<HandleId>::None` rather than a magic value, so a null handle
/// cannot reach the registry at all.
///
/// # Examples
///
/// ```rust
/// use handle_registry::HandleId;
///
/// let id = HandleId::new(0x7f3a_1000).unwrap();
/// assert_eq!(id.get(), 0x7f3a_1000);
///
/// assert!(HandleId::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct HandleId(NonZeroU64);

impl HandleId {
    /// Wraps a raw handle value, returning `None` for the null handle `0`.
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Converts a raw pointer into a handle identity (`None` for null).
    pub fn from_ptr<T>(ptr: *const T) -> Option<Self> {
        Self::new(ptr as usize as u64)
    }

    /// Returns the raw handle value.
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl From<NonZeroU64> for HandleId {
    fn from(raw: NonZeroU64) -> Self {
        Self(raw)
    }
}

impl From<HandleId> for u64 {
    fn from(id: HandleId) -> Self {
        id.get()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_null() {
        assert_eq!(HandleId::new(0), None);
        assert_eq!(HandleId::from_ptr(std::ptr::null::<u8>()), None);
    }

    #[test]
    fn test_roundtrip_raw_value() {
        let id = HandleId::new(42).unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(u64::from(id), 42);
        assert_eq!(HandleId::from(NonZeroU64::new(42).unwrap()), id);
    }

    #[test]
    fn test_from_ptr() {
        let value = 7u32;
        let ptr: *const u32 = &value;
        let id = HandleId::from_ptr(ptr).unwrap();
        assert_eq!(id.get(), ptr as usize as u64);
    }

    #[test]
    fn test_display_is_hex() {
        let id = HandleId::new(255).unwrap();
        assert_eq!(id.to_string(), "0xff");
    }

    #[test]
    fn test_option_has_no_size_overhead() {
        assert_eq!(
            std::mem::size_of::<Option<HandleId>>(),
            std::mem::size_of::<u64>()
        );
    }
}
