#![forbid(unsafe_code)]

//! "Scroll down" cue that fades out as the timeline slides in.
//!
//! The cue reads the timeline progress broadcast; it never measures the
//! timeline itself.

use folio_core::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::progress::ProgressReader;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Progress at which fading begins.
    pub fade_start: f64,
    /// Progress at which the cue is fully transparent.
    pub fade_end: f64,
    /// Horizontal shift from the anchor's centre (px).
    pub dx: f64,
    /// Gap below the anchor's bottom edge (px).
    pub dy: f64,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            fade_start: 0.55,
            fade_end: 0.75,
            dx: 24.0,
            dy: 40.0,
        }
    }
}

impl CueConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        [("cue.fade_start", self.fade_start), ("cue.fade_end", self.fade_end)]
            .into_iter()
            .filter(|(_, v)| !(0.0..=1.0).contains(v))
            .map(|(name, v)| format!("{name} must be in [0, 1], got {v}"))
            .collect()
    }
}

/// Opacity and placement for the cue.
#[derive(Debug, Clone)]
pub struct ScrollCue {
    config: CueConfig,
    progress: ProgressReader,
}

impl ScrollCue {
    #[must_use]
    pub fn new(config: CueConfig, progress: ProgressReader) -> Self {
        Self { config, progress }
    }

    /// Current opacity from the broadcast progress.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        cue_opacity(self.progress.get(), self.config.fade_start, self.config.fade_end)
    }

    /// Fixed-position top-left for the cue, rounded to whole pixels.
    #[must_use]
    pub fn position(&self, anchor: Rect) -> Point {
        Point::new(
            (anchor.x + anchor.width / 2.0 + self.config.dx).round(),
            (anchor.bottom() + self.config.dy).round(),
        )
    }
}

/// `1 → 0` as `progress` crosses the fade window.
///
/// The window bounds may be given in either order. A zero-width window
/// switches from opaque to transparent at that point.
#[must_use]
pub fn cue_opacity(progress: f64, fade_start: f64, fade_end: f64) -> f64 {
    let start = fade_start.min(fade_end);
    let end = fade_start.max(fade_end);
    if end <= start {
        return if progress >= start { 0.0 } else { 1.0 };
    }
    1.0 - ((progress - start) / (end - start)).clamp(0.0, 1.0)
}
