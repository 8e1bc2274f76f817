#![forbid(unsafe_code)]

//! Git-branch style career timeline: validation, layout and geometry.
//!
//! # Role in Folio
//! `folio-timeline` turns authored career events ([`AuthoredNode`]) and
//! branch lifetimes ([`BranchSpan`]) into a deterministic grid: one row per
//! event, one column per branch, split/merge markers, vertical segments, and
//! connector curves. Everything here is a pure computation over its inputs.
//!
//! # Pipeline
//! authored data → [`validate()`] → [`build()`] → [`BuiltTimeline`] →
//! [`Grid`] / [`connector`] (called by the rendering surface).
//!
//! # Example
//!
//! ```
//! use folio_timeline::{build, AuthoredNode, BranchSpan};
//!
//! let nodes = [
//!     AuthoredNode::new("a", "main", "Born").order(1),
//!     AuthoredNode::new("b", "main", "Start college").order(2),
//!     AuthoredNode::new("c", "school", "Graduate").order(3),
//! ];
//! let spans = [BranchSpan::closed("school", "main", "b", "c")];
//!
//! let built = build(&nodes, &spans).unwrap();
//! assert_eq!(built.rows.len(), 3);
//! assert_eq!(built.segments.len(), 1);
//! ```

pub mod builder;
pub mod config;
pub mod connector;
pub mod details;
pub mod error;
pub mod geometry;
pub mod model;
pub mod palette;
pub mod validate;

pub use builder::{build, build_with};
pub use config::{ConfigFile, LayoutConfig, TimelineDocument};
pub use connector::{Connector, ConnectorKind, connectors_for_row};
pub use details::{Details, DetailsMap};
pub use error::{ConfigError, Result, TimelineError};
pub use geometry::{COL_W, Grid, LINE_W, NODE_R, OFFSET, ROW_H, row_baseline_y};
pub use model::{
    AuthoredNode, BranchId, BranchLink, BranchSpan, BuiltTimeline, NodeKey, NodeKind,
    ResolvedSpan, Segment, SpanEnd, TimelineRow,
};
pub use palette::{BranchPalette, with_alpha};
pub use validate::{row_order, validate};
