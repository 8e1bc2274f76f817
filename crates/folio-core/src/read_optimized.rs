#![forbid(unsafe_code)]

//! Read-optimized stores for values that many readers poll and one writer sets.
//!
//! Page regions such as the scroll cue read the timeline progress on every
//! frame, while only the section owning the scroll tracker writes it. The
//! read path must never block on the writer.
//!
//! [`ReadOptimized<T>`] abstracts the store; [`ArcSwapStore`] is the only
//! implementation and is backed by `arc-swap`.
//!
//! # Constraints
//!
//! - `#![forbid(unsafe_code)]`: all safety is delegated to `arc-swap`.
//! - `T: Clone + Send + Sync`.
//! - Read path allocates nothing (`load_ref` returns a guard).
//! - Write path allocates one `Arc` per store.
//!
//! # Example
//!
//! ```
//! use folio_core::read_optimized::{ArcSwapStore, ReadOptimized};
//!
//! let store = ArcSwapStore::new(0.0_f64);
//! assert_eq!(store.load(), 0.0);
//!
//! store.store(0.5);
//! assert_eq!(store.load(), 0.5);
//! ```

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A concurrent store optimized for read-heavy access patterns.
///
/// Implementations must guarantee:
/// - `load()` never blocks the writer.
/// - `load()` returns a consistent snapshot (no torn reads).
/// - `store()` is atomic with respect to concurrent `load()` calls.
pub trait ReadOptimized<T: Clone + Send + Sync>: Send + Sync {
    /// Read the current value.
    fn load(&self) -> T;

    /// Atomically replace the stored value.
    fn store(&self, val: T);
}

// ---------------------------------------------------------------------------
// ArcSwapStore
// ---------------------------------------------------------------------------

/// Wait-free reads via [`arc_swap::ArcSwap`].
pub struct ArcSwapStore<T> {
    inner: ArcSwap<T>,
}

impl<T: Clone + Send + Sync> ArcSwapStore<T> {
    /// Create a new store with an initial value.
    pub fn new(val: T) -> Self {
        Self {
            inner: ArcSwap::from_pointee(val),
        }
    }

    /// Read without cloning; returns a guard that derefs to `T`.
    pub fn load_ref(&self) -> arc_swap::Guard<Arc<T>> {
        self.inner.load()
    }
}

impl<T: Clone + Send + Sync> ReadOptimized<T> for ArcSwapStore<T> {
    #[inline]
    fn load(&self) -> T {
        let guard = self.inner.load();
        T::clone(&guard)
    }

    #[inline]
    fn store(&self, val: T) {
        self.inner.store(Arc::new(val));
    }
}

impl<T: Clone + Send + Sync + fmt::Debug> fmt::Debug for ArcSwapStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcSwapStore")
            .field("value", &*self.inner.load())
            .finish()
    }
}

impl<T: Clone + Send + Sync + Default> Default for ArcSwapStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
