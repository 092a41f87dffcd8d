use std::fmt;
use std::sync::Arc;

/// A lazy provider of `T` values.
///
/// Generated factories store one `Provider` per dependency that the
/// dependency-injection framework resolves, and call [`Provider::get`] each
/// time a fresh value is needed. Cloning a provider clones the handle, not
/// the construction logic, so a single provider can back any number of
/// factories.
///
/// # Example
///
/// ```rust
/// use forgeron_core::Provider;
///
/// let weights = Provider::new(|| 12u64);
///
/// assert_eq!(weights.get(), 12);
/// assert_eq!(weights.get(), 12);
/// ```
pub struct Provider<T> {
    construct: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Provider<T> {
    /// Creates a provider from a construction closure.
    pub fn new(construct: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            construct: Arc::new(construct),
        }
    }

    /// Resolves a fresh instance.
    pub fn get(&self) -> T {
        (self.construct)()
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            construct: Arc::clone(&self.construct),
        }
    }
}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider").finish_non_exhaustive()
    }
}
