#![forbid(unsafe_code)]

//! Page-wide timeline progress broadcast.
//!
//! The section that owns the scroll tracker holds the only
//! [`ProgressWriter`]; any number of page regions hold a [`ProgressReader`]
//! and poll it while rendering.
//!
//! # Invariants
//!
//! 1. The value starts at `0.0` and always lies in `[0, 1]`.
//! 2. There is exactly one writer. [`ProgressWriter`] is not `Clone`.
//! 3. Reads never block the writer.

use std::sync::Arc;

use folio_core::read_optimized::{ArcSwapStore, ReadOptimized};

/// Constructor for a writer/reader pair.
#[derive(Debug)]
pub struct TimelineProgress;

impl TimelineProgress {
    /// A fresh broadcast initialised to `0.0`.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new() -> (ProgressWriter, ProgressReader) {
        let cell = Arc::new(ArcSwapStore::new(0.0_f64));
        (
            ProgressWriter {
                cell: Arc::clone(&cell),
            },
            ProgressReader { cell },
        )
    }
}

/// Write side, held by the section that owns the tracker.
#[derive(Debug)]
pub struct ProgressWriter {
    cell: Arc<ArcSwapStore<f64>>,
}

impl ProgressWriter {
    /// Publish a new value, clamped to `[0, 1]`. NaN publishes `0.0`.
    pub fn set(&self, progress: f64) {
        let value = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.cell.store(value);
    }

    /// Another reader of the same value.
    #[must_use]
    pub fn reader(&self) -> ProgressReader {
        ProgressReader {
            cell: Arc::clone(&self.cell),
        }
    }
}

/// Read side. Cheap to clone and hand to any page region.
#[derive(Debug, Clone)]
pub struct ProgressReader {
    cell: Arc<ArcSwapStore<f64>>,
}

impl ProgressReader {
    #[must_use]
    pub fn get(&self) -> f64 {
        self.cell.load()
    }
}
