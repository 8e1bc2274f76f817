#![forbid(unsafe_code)]

//! Where the tracker gets its screen positions from.
//!
//! The tracker never touches a DOM. The host implements
//! [`MeasurementProvider`] over whatever it renders into; tests substitute a
//! fake. Two providers ship with the crate:
//!
//! - [`RectMeasurements`]: the host pushes bounding rectangles as it reads
//!   them (the browser shape: `getBoundingClientRect` + `scrollY`).
//! - [`GridMeasurements`]: positions computed straight from the layout grid,
//!   for hosts that draw exactly what [`Grid`] describes.

use folio_core::{Point, Rect};
use folio_timeline::{BuiltTimeline, Grid, NodeKey};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Source of container-relative node centres.
pub trait MeasurementProvider {
    /// Centre of the circle identified by `key`, relative to the timeline
    /// container's top-left corner. `None` while it is not mounted.
    fn measure(&self, key: &NodeKey) -> Option<Point>;

    /// Document-space y of the container's top edge. `None` while the
    /// container is not mounted.
    fn container_top(&self) -> Option<f64>;
}

/// Scroll offset and visible height, supplied with every host event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Document scroll offset (`window.scrollY`).
    pub scroll_y: f64,
    /// Viewport height (`window.innerHeight`).
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    /// Same height, different scroll offset.
    #[must_use]
    pub const fn scrolled_to(self, scroll_y: f64) -> Self {
        Self { scroll_y, ..self }
    }
}

// ---------------------------------------------------------------------------
// RectMeasurements
// ---------------------------------------------------------------------------

/// Bounding rectangles pushed by the host, all in viewport coordinates.
///
/// Empty rectangles (a hidden element reports zero size) measure as `None`.
#[derive(Debug, Clone, Default)]
pub struct RectMeasurements {
    scroll_y: f64,
    container: Option<Rect>,
    nodes: FxHashMap<NodeKey, Rect>,
}

impl RectMeasurements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the container rectangle and the scroll offset it was read at.
    pub fn set_container(&mut self, rect: Rect, scroll_y: f64) {
        self.container = Some(rect);
        self.scroll_y = scroll_y;
    }

    /// Record (or replace) one node rectangle.
    pub fn set_node(&mut self, key: NodeKey, rect: Rect) {
        self.nodes.insert(key, rect);
    }

    /// Forget a node that unmounted.
    pub fn remove_node(&mut self, key: &NodeKey) -> Option<Rect> {
        self.nodes.remove(key)
    }

    /// Forget everything (container unmounted).
    pub fn clear(&mut self) {
        self.container = None;
        self.nodes.clear();
    }
}

impl MeasurementProvider for RectMeasurements {
    fn measure(&self, key: &NodeKey) -> Option<Point> {
        let container = self.container?;
        let rect = self.nodes.get(key)?;
        if rect.is_empty() {
            return None;
        }
        Some(rect.center_within(&container))
    }

    fn container_top(&self) -> Option<f64> {
        self.container.map(|c| self.scroll_y + c.y)
    }
}

// ---------------------------------------------------------------------------
// GridMeasurements
// ---------------------------------------------------------------------------

/// Positions derived from the layout grid instead of measured.
#[derive(Debug, Clone, Copy)]
pub struct GridMeasurements<'a> {
    grid: &'a Grid,
    built: &'a BuiltTimeline,
    container_top: f64,
}

impl<'a> GridMeasurements<'a> {
    /// `container_top` is the document-space y where row 0 starts.
    #[must_use]
    pub fn new(grid: &'a Grid, built: &'a BuiltTimeline, container_top: f64) -> Self {
        Self {
            grid,
            built,
            container_top,
        }
    }
}

impl MeasurementProvider for GridMeasurements<'_> {
    fn measure(&self, key: &NodeKey) -> Option<Point> {
        let row = self.built.rows.get(key.row_index)?;
        self.grid.node_center(key, row)
    }

    fn container_top(&self) -> Option<f64> {
        Some(self.container_top)
    }
}
