/// Construction-time settings for a [`HandleRegistry`](crate::HandleRegistry).
///
/// # Examples
///
/// ```rust
/// use handle_registry::{HandleRegistry, RegistryOptions};
///
/// let registry = HandleRegistry::with_options(
///     RegistryOptions::default().capacity(256).leak_check(false),
/// );
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Number of entries to reserve up front.
    pub capacity: usize,
    /// Report live handles when the registry is dropped without a teardown.
    pub leak_check: bool,
}

impl RegistryOptions {
    pub const fn new() -> Self {
        Self {
            capacity: 0,
            leak_check: true,
        }
    }

    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub const fn leak_check(mut self, enabled: bool) -> Self {
        self.leak_check = enabled;
        self
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self::new()
    }
}
