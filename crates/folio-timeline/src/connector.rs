#![forbid(unsafe_code)]

//! Split/merge connector curves.
//!
//! A connector joins a parent circle and a child circle on the same row:
//! quarter arc, straight horizontal run, quarter arc. Split connectors bulge
//! downward (the child sits below the baseline); merge connectors are the
//! vertical mirror (the child sits above it).
//!
//! The path is expressed relative to the parent circle's centre, so the
//! rendering surface only has to place an overflow-visible SVG there.
//!
//! # Degenerate geometry
//!
//! With narrow columns `|dx| < |dy|` the straight run would be negative.
//! The radius is clamped to `min(|dy|, |dx|) / 2` and the run to `>= 0`, so
//! the path is always well formed.

use folio_core::Point;

use crate::error::{Result, TimelineError};
use crate::geometry::Grid;
use crate::model::{BranchId, TimelineRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    Split,
    Merge,
}

/// One parent↔child curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub kind: ConnectorKind,
    /// Child branch; its color is used for the stroke.
    pub branch: BranchId,
    pub parent: BranchId,
    /// Parent circle centre (path origin).
    pub from: Point,
    /// Child circle centre.
    pub to: Point,
    pub radius: f64,
    /// Length of the straight horizontal run.
    pub flat: f64,
}

impl Connector {
    /// Build the curve between two circle centres.
    #[must_use]
    pub fn between(
        kind: ConnectorKind,
        branch: BranchId,
        parent: BranchId,
        from: Point,
        to: Point,
    ) -> Self {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        let radius = (dy / 2.0).min(dx / 2.0).max(0.0);
        let flat = (dx - 2.0 * radius).max(0.0);
        Self {
            kind,
            branch,
            parent,
            from,
            to,
            radius,
            flat,
        }
    }

    /// Bounding box size `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        ((self.to.x - self.from.x).abs(), (self.to.y - self.from.y).abs())
    }

    /// SVG path data relative to [`Connector::from`].
    #[must_use]
    pub fn to_svg_path(&self) -> String {
        let sx = if self.to.x < self.from.x { -1.0 } else { 1.0 };
        let v = match self.kind {
            ConnectorKind::Split => self.radius,
            ConnectorKind::Merge => -self.radius,
        };
        let r = self.radius * sx;
        let run = (self.radius + self.flat) * sx;
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;

        format!("M0 0 Q 0 {v} {r} {v} H {run} Q {dx} {v} {dx} {dy}")
    }
}

/// Connectors drawn on one row: the split curve first, then the merge curve.
pub fn connectors_for_row(grid: &Grid, row_index: usize, row: &TimelineRow) -> Result<Vec<Connector>> {
    let mut out = Vec::with_capacity(2);
    for (kind, link) in [
        (ConnectorKind::Split, row.split.as_ref()),
        (ConnectorKind::Merge, row.merge.as_ref()),
    ] {
        let Some(link) = link else { continue };
        let column = |b: &BranchId| {
            grid.column_center_x(b)
                .ok_or_else(|| TimelineError::UnknownColumn { branch: b.clone() })
        };
        let from = Point::new(
            column(&link.parent)?,
            grid.node_center_y(row_index, &link.parent, row),
        );
        let to = Point::new(
            column(&link.branch)?,
            grid.node_center_y(row_index, &link.branch, row),
        );
        out.push(Connector::between(
            kind,
            link.branch.clone(),
            link.parent.clone(),
            from,
            to,
        ));
    }
    Ok(out)
}
