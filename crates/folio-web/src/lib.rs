#![forbid(unsafe_code)]

//! `folio-web` drives the timeline's scroll-linked spotlight.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page pushes scroll/resize events and
//!   measurements; nothing here touches a DOM.
//! - **One recomputation per frame**: bursts of events fold into a single
//!   update through [`folio_core::frame_coalescer`].
//! - **Single writer**: the section that owns the tracker is the only writer
//!   of the progress broadcast.
//!
//! Typical wiring:
//!
//! ```
//! use folio_timeline::{build, AuthoredNode, BranchSpan, Grid};
//! use folio_web::{GridMeasurements, TimelineProgress, TrackedTimeline, TrackerConfig, Viewport};
//!
//! let nodes = [
//!     AuthoredNode::new("a", "main", "Born").order(1),
//!     AuthoredNode::new("b", "main", "Start college").order(2),
//!     AuthoredNode::new("c", "school", "Graduate").order(3),
//! ];
//! let built = build(&nodes, &[BranchSpan::closed("school", "main", "b", "c")]).unwrap();
//! let grid = Grid::default();
//! let dom = GridMeasurements::new(&grid, &built, 800.0);
//!
//! let (writer, progress) = TimelineProgress::new();
//! let mut timeline = TrackedTimeline::new(TrackerConfig::default(), writer);
//! timeline.tracker_mut().register_all(&built, &dom);
//! timeline.mount(Viewport::new(0.0, 900.0), &dom);
//!
//! let out = timeline.on_frame(&dom).unwrap();
//! assert_eq!(out.active.id, "a");
//! assert_eq!(progress.get(), 0.0);
//! ```

pub mod config;
pub mod cue;
pub mod measure;
pub mod progress;
pub mod registry;
pub mod sections;
pub mod tracker;

pub use config::FolioConfig;
pub use cue::{CueConfig, ScrollCue, cue_opacity};
pub use measure::{GridMeasurements, MeasurementProvider, RectMeasurements, Viewport};
pub use progress::{ProgressReader, ProgressWriter, TimelineProgress};
pub use registry::{NodeRegistry, RegisteredNode};
pub use sections::{ActiveSection, SectionEntry, SectionFade, section_fade};
pub use tracker::{
    ActiveNode, Breakpoints, Phase, ScrollTracker, TrackedTimeline, TrackerConfig, TrackerOutput,
};
