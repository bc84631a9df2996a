use std::fmt;
use std::sync::OnceLock;

/// Lifecycle of a [`Sticky`] cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StickyState {
    Uninitialized,
    Unavailable,
    Ready,
}

/// A value computed at most once per process, remembering failure as well
/// as success.
///
/// Concurrent first callers block until the single initializer finishes and
/// then all observe its outcome. A failed initialization is never retried.
pub struct Sticky<T> {
    cell: OnceLock<Option<T>>,
}

impl<T> Sticky<T> {
    pub const fn new() -> Self {
        Self { cell: OnceLock::new() }
    }

    pub fn get_or_init(&self, init: impl FnOnce() -> Option<T>) -> Option<&T> {
        self.cell.get_or_init(init).as_ref()
    }

    /// The cached value, without attempting initialization.
    pub fn get(&self) -> Option<&T> {
        self.cell.get().and_then(Option::as_ref)
    }

    pub fn state(&self) -> StickyState {
        match self.cell.get() {
            None => StickyState::Uninitialized,
            Some(None) => StickyState::Unavailable,
            Some(Some(_)) => StickyState::Ready,
        }
    }
}

impl<T> Default for Sticky<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Sticky<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sticky").field(&self.cell.get()).finish()
    }
}
