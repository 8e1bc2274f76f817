#![forbid(unsafe_code)]

//! Grid geometry: (row, branch) → pixel coordinates.
//!
//! Every function here is pure. Columns are laid out left to right in
//! [`Grid::branch_order`]; rows top to bottom in built-row order.
//!
//! # Invariants
//!
//! 1. `row_baseline_y(i) = i·row_h + row_h/2`.
//! 2. A freshly split child sits `offset` below the baseline; a merging
//!    child sits `offset` above it; every other circle sits on it.
//! 3. Split and merge shifts never combine for one (row, branch) pair: the
//!    validator guarantees a span's merge row is strictly after its split row.
//!
//! # Failure Modes
//!
//! A branch missing from `branch_order` has no column: [`Grid::column_center_x`]
//! returns `None`. Call [`Grid::check_columns`] once after building to turn
//! that into a configuration error up front.

use folio_core::Point;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};
use crate::model::{BranchId, BuiltTimeline, NodeKey, TimelineRow};
use crate::palette::DEFAULT_BRANCH_ORDER;

/// Width of one branch column (px).
pub const COL_W: f64 = 120.0;
/// Height of one timeline row (px).
pub const ROW_H: f64 = 120.0;
/// Node circle radius (px).
pub const NODE_R: f64 = 8.0;
/// Vertical nudge for split/merge children (px).
pub const OFFSET: f64 = 26.0;
/// Stroke thickness for segments and connectors (px).
pub const LINE_W: f64 = 4.0;

/// Baseline y-centre of a row under the default metrics.
#[inline]
#[must_use]
pub fn row_baseline_y(row_index: usize) -> f64 {
    row_index as f64 * ROW_H + ROW_H / 2.0
}

/// Layout metrics plus the left-to-right column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    pub col_w: f64,
    pub row_h: f64,
    pub node_r: f64,
    pub offset: f64,
    pub line_w: f64,
    pub branch_order: Vec<BranchId>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            col_w: COL_W,
            row_h: ROW_H,
            node_r: NODE_R,
            offset: OFFSET,
            line_w: LINE_W,
            branch_order: DEFAULT_BRANCH_ORDER
                .iter()
                .copied()
                .map(BranchId::from)
                .collect(),
        }
    }
}

impl Grid {
    /// Default metrics with a custom column order.
    #[must_use]
    pub fn with_order<I, B>(order: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<BranchId>,
    {
        Self {
            branch_order: order.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Column index of `branch`.
    #[must_use]
    pub fn column_index(&self, branch: &BranchId) -> Option<usize> {
        self.branch_order.iter().position(|b| b == branch)
    }

    /// X-centre of a branch column.
    #[must_use]
    pub fn column_center_x(&self, branch: &BranchId) -> Option<f64> {
        self.column_index(branch)
            .map(|i| i as f64 * self.col_w + self.col_w / 2.0)
    }

    /// Baseline y-centre of a row.
    #[inline]
    #[must_use]
    pub fn row_baseline_y(&self, row_index: usize) -> f64 {
        row_index as f64 * self.row_h + self.row_h / 2.0
    }

    /// Y-centre of the circle for `branch` on `row`, with split/merge nudges.
    #[must_use]
    pub fn node_center_y(&self, row_index: usize, branch: &BranchId, row: &TimelineRow) -> f64 {
        let base = self.row_baseline_y(row_index);
        if row.split_branch() == Some(branch) {
            base + self.offset
        } else if row.merge_branch() == Some(branch) {
            base - self.offset
        } else {
            base
        }
    }

    /// Centre of one drawn circle.
    #[must_use]
    pub fn node_center(&self, key: &NodeKey, row: &TimelineRow) -> Option<Point> {
        let x = self.column_center_x(&key.branch)?;
        Some(Point::new(
            x,
            self.node_center_y(key.row_index, &key.branch, row),
        ))
    }

    /// Container size `(width, height)` for `row_count` rows.
    #[must_use]
    pub fn grid_size(&self, row_count: usize) -> (f64, f64) {
        (
            self.branch_order.len() as f64 * self.col_w,
            row_count as f64 * self.row_h,
        )
    }

    /// Ensure every branch drawn by `built` has a column.
    pub fn check_columns(&self, built: &BuiltTimeline) -> Result<()> {
        for row in &built.rows {
            for branch in [Some(&row.node), row.split_branch(), row.merge_branch()]
                .into_iter()
                .flatten()
                .chain(row.parent())
            {
                if self.column_index(branch).is_none() {
                    return Err(TimelineError::UnknownColumn {
                        branch: branch.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Range checks. An empty list means the grid is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (name, value) in [
            ("grid.col_w", self.col_w),
            ("grid.row_h", self.row_h),
            ("grid.node_r", self.node_r),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{name} must be > 0, got {value}"));
            }
        }
        if !(self.offset.is_finite() && self.offset >= 0.0) {
            errors.push(format!("grid.offset must be >= 0, got {}", self.offset));
        }
        if !(self.line_w.is_finite() && self.line_w >= 0.0) {
            errors.push(format!("grid.line_w must be >= 0, got {}", self.line_w));
        }
        if self.offset + self.node_r >= self.row_h / 2.0 {
            errors.push(format!(
                "grid.offset + grid.node_r must stay inside half a row ({} >= {})",
                self.offset + self.node_r,
                self.row_h / 2.0
            ));
        }
        for (i, b) in self.branch_order.iter().enumerate() {
            if self.branch_order[..i].contains(b) {
                errors.push(format!("grid.branch_order lists {b} twice"));
            }
        }
        errors
    }
}
