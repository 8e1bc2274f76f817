#![forbid(unsafe_code)]

//! Scroll tracker: scroll offset → phase, active node, spotlight.
//!
//! # Model
//!
//! Two breakpoints are measured once the nodes are mounted:
//!
//! ```text
//! start = container_top + first.y − start_fraction · viewport.height
//! end   = container_top + last.y  − end_fraction   · viewport.height
//! ```
//!
//! `start` is the scroll offset at which the first node sits 20% down the
//! viewport; `end` is where the last node sits 80% down.
//!
//! - **Phase 1** (`scroll_y < start`): the spotlight is pinned to the first
//!   node and the first node is active.
//! - **Phase 2** (`scroll_y >= start`): `f = clamp((y − start)/(end − start))`,
//!   `float_idx = f · (n − 1)`. The spotlight is the linear interpolation
//!   between the nodes at `floor(float_idx)` and `floor(float_idx) + 1`; the
//!   active node is the one at `ceil(float_idx)`.
//!
//! # Invariants
//!
//! 1. No output is produced until the breakpoints have been measured.
//! 2. In phase 2 the active index is monotone in `scroll_y`.
//! 3. The spotlight lies on the segment between the two bracketing nodes.
//! 4. `layout_progress` is `f` in phase 2 and `0` in phase 1.
//!
//! # Failure Modes
//!
//! - `end <= start` (very short timeline, tall viewport): progress jumps to
//!   `1` as soon as `start` is reached.
//! - A non-finite scroll offset produces no output.
//! - A node the provider can no longer measure is dropped from the registry
//!   with a warning.

use folio_core::Point;
use folio_core::frame_coalescer::{FrameCoalescer, FrameEvent, FrameRequest};
use folio_timeline::{BuiltTimeline, NodeKey};
use serde::{Deserialize, Serialize};

use crate::measure::{MeasurementProvider, Viewport};
use crate::progress::ProgressWriter;
use crate::registry::{NodeRegistry, RegisteredNode};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Viewport-relative target fractions for the two breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Where the first node sits when phase 2 begins.
    pub start_fraction: f64,
    /// Where the last node sits when progress reaches 1.
    pub end_fraction: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            start_fraction: 0.2,
            end_fraction: 0.8,
        }
    }
}

impl TrackerConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (name, value) in [
            ("tracker.start_fraction", self.start_fraction),
            ("tracker.end_fraction", self.end_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{name} must be in [0, 1], got {value}"));
            }
        }
        if self.start_fraction >= self.end_fraction {
            errors.push(format!(
                "tracker.start_fraction ({}) must be < tracker.end_fraction ({})",
                self.start_fraction, self.end_fraction
            ));
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before the first breakpoint: pinned to the first node.
    Phase1,
    /// Interpolating between nodes.
    Phase2,
}

/// The two measured scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    pub start: f64,
    pub end: f64,
}

impl Breakpoints {
    /// Normalised progress `f` in `[0, 1]` for a scroll offset.
    #[must_use]
    pub fn progress(&self, scroll_y: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if scroll_y >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / span).clamp(0.0, 1.0)
    }
}

/// The highlighted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveNode {
    pub id: String,
    pub key: NodeKey,
}

impl From<&RegisteredNode> for ActiveNode {
    fn from(node: &RegisteredNode) -> Self {
        Self {
            id: node.id.clone(),
            key: node.key.clone(),
        }
    }
}

/// Everything the rendering surface needs after one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerOutput {
    pub phase: Phase,
    pub active: ActiveNode,
    /// Container-relative spotlight centre.
    pub spotlight: Point,
    pub layout_progress: f64,
    pub ready: bool,
}

// ---------------------------------------------------------------------------
// ScrollTracker
// ---------------------------------------------------------------------------

/// Phase/spotlight state machine over a registry of measured nodes.
///
/// Owns only runtime positions; it never sees authored data.
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    config: TrackerConfig,
    registry: NodeRegistry,
    breakpoints: Option<Breakpoints>,
    phase: Option<Phase>,
}

impl ScrollTracker {
    #[must_use]
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn breakpoints(&self) -> Option<Breakpoints> {
        self.breakpoints
    }

    /// Whether breakpoints have been measured.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.breakpoints.is_some()
    }

    /// Last phase emitted by [`ScrollTracker::update`].
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Measure `key` and insert or replace its entry.
    ///
    /// Returns `false` when the provider cannot measure it; any stale entry
    /// for the key is dropped in that case.
    pub fn register_node<P>(&mut self, id: impl Into<String>, key: NodeKey, provider: &P) -> bool
    where
        P: MeasurementProvider + ?Sized,
    {
        let id = id.into();
        let Some(position) = provider.measure(&key) else {
            if self.registry.remove(&key).is_some() {
                tracing::warn!(
                    id = %id,
                    row = key.row_index,
                    branch = %key.branch,
                    "registered node can no longer be measured"
                );
            }
            return false;
        };
        tracing::debug!(
            id = %id,
            row = key.row_index,
            branch = %key.branch,
            x = position.x,
            y = position.y,
            "node registered"
        );
        self.registry.upsert(RegisteredNode { id, key, position });
        true
    }

    /// Register every circle of a built timeline. Returns how many measured.
    pub fn register_all<P>(&mut self, built: &BuiltTimeline, provider: &P) -> usize
    where
        P: MeasurementProvider + ?Sized,
    {
        let mut registered = 0;
        for key in built.all_node_keys() {
            let Some(row) = built.rows.get(key.row_index) else {
                continue;
            };
            if self.register_node(row.id.clone(), key, provider) {
                registered += 1;
            }
        }
        registered
    }

    /// Drop a node whose element unmounted.
    pub fn unregister(&mut self, key: &NodeKey) -> bool {
        self.registry.remove(key).is_some()
    }

    /// Re-measure every registered node (after a resize or reflow).
    ///
    /// Returns the number of nodes still registered.
    pub fn remeasure<P>(&mut self, provider: &P) -> usize
    where
        P: MeasurementProvider + ?Sized,
    {
        let entries: Vec<(String, NodeKey)> = self
            .registry
            .as_slice()
            .iter()
            .map(|n| (n.id.clone(), n.key.clone()))
            .collect();
        for (id, key) in entries {
            self.register_node(id, key, provider);
        }
        self.registry.len()
    }

    /// Compute the breakpoints from the first and last registered nodes.
    ///
    /// Leaves the tracker not ready (and returns `None`) while there are no
    /// nodes or the container is not mounted.
    pub fn measure_breakpoints<P>(&mut self, viewport: Viewport, provider: &P) -> Option<Breakpoints>
    where
        P: MeasurementProvider + ?Sized,
    {
        let measured = self.compute_breakpoints(viewport, provider);
        if let Some(bp) = measured {
            tracing::debug!(start = bp.start, end = bp.end, "breakpoints measured");
        }
        self.breakpoints = measured;
        measured
    }

    fn compute_breakpoints<P>(&self, viewport: Viewport, provider: &P) -> Option<Breakpoints>
    where
        P: MeasurementProvider + ?Sized,
    {
        let top = provider.container_top()?;
        let first = self.registry.first()?;
        let last = self.registry.last()?;
        Some(Breakpoints {
            start: top + first.position.y - self.config.start_fraction * viewport.height,
            end: top + last.position.y - self.config.end_fraction * viewport.height,
        })
    }

    /// Recompute for a scroll position. `None` while not ready.
    pub fn update(&mut self, viewport: Viewport) -> Option<TrackerOutput> {
        let bp = self.breakpoints?;
        let y = viewport.scroll_y;
        if !y.is_finite() {
            return None;
        }
        let nodes = self.registry.as_slice();
        let first = nodes.first()?;

        let output = if y < bp.start {
            TrackerOutput {
                phase: Phase::Phase1,
                active: ActiveNode::from(first),
                spotlight: first.position,
                layout_progress: 0.0,
                ready: true,
            }
        } else {
            let f = bp.progress(y);
            let last = nodes.len() - 1;
            let float_idx = f * last as f64;
            let lo = (float_idx.floor() as usize).min(last);
            let hi = (lo + 1).min(last);
            let frac = float_idx - lo as f64;
            let active = (float_idx.ceil() as usize).min(last);
            TrackerOutput {
                phase: Phase::Phase2,
                active: ActiveNode::from(&nodes[active]),
                spotlight: nodes[lo].position.lerp(nodes[hi].position, frac),
                layout_progress: f,
                ready: true,
            }
        };

        if self.phase != Some(output.phase) {
            tracing::debug!(
                from = ?self.phase,
                to = ?output.phase,
                scroll_y = y,
                "tracker phase changed"
            );
            self.phase = Some(output.phase);
        }
        Some(output)
    }
}

// ---------------------------------------------------------------------------
// TrackedTimeline
// ---------------------------------------------------------------------------

/// Tracker wired to frame coalescing and the progress broadcast.
///
/// The host forwards scroll/resize events, requests an animation frame when
/// told to, and calls [`TrackedTimeline::on_frame`] from the frame callback.
///
/// ```
/// use folio_core::frame_coalescer::FrameRequest;
/// use folio_web::{TimelineProgress, TrackedTimeline, TrackerConfig, Viewport};
///
/// let (writer, reader) = TimelineProgress::new();
/// let mut timeline = TrackedTimeline::new(TrackerConfig::default(), writer);
///
/// assert_eq!(timeline.on_scroll(Viewport::new(0.0, 800.0)), FrameRequest::Schedule);
/// assert_eq!(
///     timeline.on_scroll(Viewport::new(5.0, 800.0)),
///     FrameRequest::AlreadyScheduled
/// );
/// timeline.unmount();
/// assert_eq!(reader.get(), 0.0);
/// ```
#[derive(Debug)]
pub struct TrackedTimeline {
    tracker: ScrollTracker,
    frames: FrameCoalescer<Viewport>,
    progress: ProgressWriter,
    last: Option<TrackerOutput>,
}

impl TrackedTimeline {
    #[must_use]
    pub fn new(config: TrackerConfig, progress: ProgressWriter) -> Self {
        Self {
            tracker: ScrollTracker::new(config),
            frames: FrameCoalescer::new(),
            progress,
            last: None,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ScrollTracker {
        &mut self.tracker
    }

    /// Most recent output, if any frame has produced one.
    #[must_use]
    pub fn output(&self) -> Option<&TrackerOutput> {
        self.last.as_ref()
    }

    /// Measure breakpoints and schedule the first recomputation.
    pub fn mount<P>(&mut self, viewport: Viewport, provider: &P) -> FrameRequest
    where
        P: MeasurementProvider + ?Sized,
    {
        self.tracker.measure_breakpoints(viewport, provider);
        self.frames.push(FrameEvent::Scroll(viewport))
    }

    pub fn on_scroll(&mut self, viewport: Viewport) -> FrameRequest {
        self.frames.push(FrameEvent::Scroll(viewport))
    }

    pub fn on_resize(&mut self, viewport: Viewport) -> FrameRequest {
        self.frames.push(FrameEvent::Resize(viewport))
    }

    /// Animation-frame callback.
    ///
    /// Handles the latest viewport of the burst; a resize anywhere in the
    /// burst re-measures nodes and breakpoints first. Publishes
    /// `layout_progress` when an output is produced.
    pub fn on_frame<P>(&mut self, provider: &P) -> Option<&TrackerOutput>
    where
        P: MeasurementProvider + ?Sized,
    {
        let frame = self.frames.take()?;
        if frame.resized {
            self.tracker.remeasure(provider);
            self.tracker.measure_breakpoints(frame.latest, provider);
        }
        let output = self.tracker.update(frame.latest)?;
        self.progress.set(output.layout_progress);
        self.last = Some(output);
        self.last.as_ref()
    }

    /// Stop listening. Returns `true` if a frame was pending, in which case
    /// the host should cancel its animation-frame handle too.
    pub fn unmount(&mut self) -> bool {
        self.frames.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::TimelineProgress;
    use rustc_hash::FxHashMap;

    /// Nodes stacked vertically every 100px, starting at y = 50.
    #[derive(Default)]
    struct FakeDom {
        top: Option<f64>,
        nodes: FxHashMap<NodeKey, Point>,
    }

    impl FakeDom {
        fn column(count: usize, top: f64) -> Self {
            let nodes = (0..count)
                .map(|i| (NodeKey::new(i, "main"), Point::new(60.0, 50.0 + 100.0 * i as f64)))
                .collect();
            Self {
                top: Some(top),
                nodes,
            }
        }
    }

    impl MeasurementProvider for FakeDom {
        fn measure(&self, key: &NodeKey) -> Option<Point> {
            self.nodes.get(key).copied()
        }

        fn container_top(&self) -> Option<f64> {
            self.top
        }
    }

    fn tracker_for(dom: &FakeDom, viewport: Viewport) -> ScrollTracker {
        let mut tracker = ScrollTracker::new(TrackerConfig::default());
        for i in 0..dom.nodes.len() {
            assert!(tracker.register_node(format!("n{i}"), NodeKey::new(i, "main"), dom));
        }
        tracker.measure_breakpoints(viewport, dom);
        tracker
    }

    #[test]
    fn not_ready_without_nodes() {
        let dom = FakeDom::column(0, 0.0);
        let mut tracker = ScrollTracker::new(TrackerConfig::default());
        assert_eq!(tracker.measure_breakpoints(Viewport::new(0.0, 1000.0), &dom), None);
        assert!(!tracker.is_ready());
        assert_eq!(tracker.update(Viewport::new(500.0, 1000.0)), None);
    }

    #[test]
    fn not_ready_without_container() {
        let mut dom = FakeDom::column(3, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 1000.0));
        dom.top = None;
        assert_eq!(tracker.measure_breakpoints(Viewport::new(0.0, 1000.0), &dom), None);
        assert_eq!(tracker.update(Viewport::new(0.0, 1000.0)), None);
    }

    #[test]
    fn breakpoints_use_viewport_fractions() {
        // Five nodes at y = 50..450, container at 1000, viewport 1000 tall.
        let dom = FakeDom::column(5, 1000.0);
        let tracker = tracker_for(&dom, Viewport::new(0.0, 1000.0));
        let bp = tracker.breakpoints().unwrap();
        assert_eq!(bp.start, 1000.0 + 50.0 - 200.0);
        assert_eq!(bp.end, 1000.0 + 450.0 - 800.0);
    }

    #[test]
    fn phase1_pins_to_first_node() {
        let dom = FakeDom::column(5, 1000.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 1000.0));
        let out = tracker.update(Viewport::new(0.0, 1000.0)).unwrap();
        assert_eq!(out.phase, Phase::Phase1);
        assert_eq!(out.active.id, "n0");
        assert_eq!(out.spotlight, Point::new(60.0, 50.0));
        assert_eq!(out.layout_progress, 0.0);
        assert!(out.ready);
    }

    #[test]
    fn phase2_interpolates_and_activates_ceil() {
        // Container at 0, 100px viewport: start = 50 - 20, end = 450 - 80.
        let dom = FakeDom::column(5, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 100.0));
        let bp = tracker.breakpoints().unwrap();
        assert_eq!((bp.start, bp.end), (30.0, 370.0));

        // f = 0.375 → float_idx = 1.5: halfway between n1 and n2, n2 active.
        let y = 30.0 + 0.375 * 340.0;
        let out = tracker.update(Viewport::new(y, 100.0)).unwrap();
        assert_eq!(out.phase, Phase::Phase2);
        assert_eq!(out.active.id, "n2");
        assert_eq!(out.spotlight, Point::new(60.0, 200.0));
        assert_eq!(out.layout_progress, 0.375);
    }

    #[test]
    fn exact_node_boundary_activates_that_node() {
        let dom = FakeDom::column(5, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 100.0));
        // f = 0.25 → float_idx = 1.0 exactly.
        let out = tracker.update(Viewport::new(30.0 + 85.0, 100.0)).unwrap();
        assert_eq!(out.active.id, "n1");
        assert_eq!(out.spotlight, Point::new(60.0, 150.0));
    }

    #[test]
    fn past_the_end_clamps_to_last_node() {
        let dom = FakeDom::column(5, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 100.0));
        let out = tracker.update(Viewport::new(10_000.0, 100.0)).unwrap();
        assert_eq!(out.active.id, "n4");
        assert_eq!(out.spotlight, Point::new(60.0, 450.0));
        assert_eq!(out.layout_progress, 1.0);
    }

    #[test]
    fn collapsed_breakpoints_jump_to_full_progress() {
        // One node: start = 50 - 200, end = 50 - 800, end < start.
        let dom = FakeDom::column(1, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 1000.0));
        let bp = tracker.breakpoints().unwrap();
        assert!(bp.end < bp.start);
        let out = tracker.update(Viewport::new(bp.start, 1000.0)).unwrap();
        assert_eq!(out.phase, Phase::Phase2);
        assert_eq!(out.layout_progress, 1.0);
        assert_eq!(out.active.id, "n0");
    }

    #[test]
    fn non_finite_scroll_is_ignored() {
        let dom = FakeDom::column(3, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 100.0));
        assert_eq!(tracker.update(Viewport::new(f64::NAN, 100.0)), None);
    }

    #[test]
    fn phase_is_remembered() {
        let dom = FakeDom::column(3, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 100.0));
        assert_eq!(tracker.phase(), None);
        tracker.update(Viewport::new(0.0, 100.0));
        assert_eq!(tracker.phase(), Some(Phase::Phase1));
        tracker.update(Viewport::new(500.0, 100.0));
        assert_eq!(tracker.phase(), Some(Phase::Phase2));
    }

    #[test]
    fn unmeasurable_node_is_dropped() {
        let mut dom = FakeDom::column(3, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 100.0));
        dom.nodes.remove(&NodeKey::new(2, "main"));
        assert!(!tracker.register_node("n2", NodeKey::new(2, "main"), &dom));
        assert_eq!(tracker.registry().len(), 2);
    }

    #[test]
    fn remeasure_picks_up_moved_nodes() {
        let mut dom = FakeDom::column(3, 0.0);
        let mut tracker = tracker_for(&dom, Viewport::new(0.0, 100.0));
        dom.nodes.insert(NodeKey::new(0, "main"), Point::new(60.0, 900.0));
        assert_eq!(tracker.remeasure(&dom), 3);
        let ids: Vec<&str> = tracker
            .registry()
            .as_slice()
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, ["n1", "n2", "n0"]);
    }

    #[test]
    fn tracked_timeline_coalesces_and_publishes() {
        let dom = FakeDom::column(5, 0.0);
        let (writer, reader) = TimelineProgress::new();
        let mut timeline = TrackedTimeline::new(TrackerConfig::default(), writer);
        for i in 0..5 {
            timeline
                .tracker_mut()
                .register_node(format!("n{i}"), NodeKey::new(i, "main"), &dom);
        }

        let vp = Viewport::new(0.0, 100.0);
        assert_eq!(timeline.mount(vp, &dom), FrameRequest::Schedule);
        assert_eq!(
            timeline.on_scroll(vp.scrolled_to(100.0)),
            FrameRequest::AlreadyScheduled
        );
        assert_eq!(
            timeline.on_scroll(vp.scrolled_to(370.0)),
            FrameRequest::AlreadyScheduled
        );

        let out = timeline.on_frame(&dom).cloned().unwrap();
        assert_eq!(out.active.id, "n4");
        assert_eq!(reader.get(), 1.0);
        assert!(timeline.on_frame(&dom).is_none(), "burst handled once");
        assert_eq!(timeline.output(), Some(&out));
    }

    #[test]
    fn resize_remeasures_breakpoints() {
        let dom = FakeDom::column(5, 0.0);
        let (writer, _reader) = TimelineProgress::new();
        let mut timeline = TrackedTimeline::new(TrackerConfig::default(), writer);
        for i in 0..5 {
            timeline
                .tracker_mut()
                .register_node(format!("n{i}"), NodeKey::new(i, "main"), &dom);
        }
        timeline.mount(Viewport::new(0.0, 100.0), &dom);
        let _ = timeline.on_frame(&dom);
        assert_eq!(timeline.tracker().breakpoints().map(|b| b.start), Some(30.0));

        timeline.on_resize(Viewport::new(0.0, 200.0));
        let _ = timeline.on_frame(&dom);
        assert_eq!(timeline.tracker().breakpoints().map(|b| b.start), Some(10.0));
    }

    #[test]
    fn unmount_cancels_pending_frame() {
        let dom = FakeDom::column(2, 0.0);
        let (writer, reader) = TimelineProgress::new();
        let mut timeline = TrackedTimeline::new(TrackerConfig::default(), writer);
        timeline.on_scroll(Viewport::new(400.0, 100.0));
        assert!(timeline.unmount());
        assert!(timeline.on_frame(&dom).is_none());
        assert_eq!(reader.get(), 0.0);
    }

    #[test]
    fn config_validation() {
        assert!(TrackerConfig::default().validate().is_empty());
        let bad = TrackerConfig {
            start_fraction: 0.9,
            end_fraction: 1.5,
        };
        assert_eq!(bad.validate().len(), 2);
    }
}
