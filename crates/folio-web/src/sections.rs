#![forbid(unsafe_code)]

//! Page-section visibility: which section is active, and how far the next
//! one has faded the current one out.
//!
//! Both consume intersection ratios reported by the host (an
//! `IntersectionObserver` in a browser).

use serde::{Deserialize, Serialize};

/// One intersection report for a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub id: String,
    pub intersecting: bool,
    /// Visible fraction of the section, `0..=1`.
    pub ratio: f64,
}

impl SectionEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, intersecting: bool, ratio: f64) -> Self {
        Self {
            id: id.into(),
            intersecting,
            ratio,
        }
    }
}

// ---------------------------------------------------------------------------
// ActiveSection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Tracked {
    id: String,
    intersecting: bool,
    ratio: f64,
}

/// Tracks the most visible intersecting section among a fixed set of ids.
///
/// Reports arrive in batches that only contain sections whose visibility
/// changed; the last report per section is kept. Ties go to the section
/// listed first.
#[derive(Debug, Clone)]
pub struct ActiveSection {
    sections: Vec<Tracked>,
    active: Option<usize>,
}

impl ActiveSection {
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: ids
                .into_iter()
                .map(|id| Tracked {
                    id: id.into(),
                    intersecting: false,
                    ratio: 0.0,
                })
                .collect(),
            active: None,
        }
    }

    /// Currently active section id.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.map(|i| self.sections[i].id.as_str())
    }

    /// Apply a batch of reports. Returns `true` if the active id changed.
    ///
    /// Reports for ids that are not tracked are ignored.
    pub fn observe<'a>(&mut self, entries: impl IntoIterator<Item = &'a SectionEntry>) -> bool {
        for entry in entries {
            if let Some(s) = self.sections.iter_mut().find(|s| s.id == entry.id) {
                s.intersecting = entry.intersecting;
                s.ratio = entry.ratio;
            }
        }

        let next = self
            .sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.intersecting)
            .fold(None::<(usize, f64)>, |best, (i, s)| match best {
                Some((_, r)) if r >= s.ratio => best,
                _ => Some((i, s.ratio)),
            })
            .map(|(i, _)| i);

        let changed = next != self.active;
        if changed {
            tracing::debug!(
                from = ?self.active(),
                to = ?next.map(|i| self.sections[i].id.as_str()),
                "active section changed"
            );
            self.active = next;
        }
        changed
    }
}

// ---------------------------------------------------------------------------
// Next-section fade
// ---------------------------------------------------------------------------

/// Ratio window over which the current section fades out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionFade {
    pub start: f64,
    pub end: f64,
}

impl Default for SectionFade {
    fn default() -> Self {
        Self {
            start: 0.3,
            end: 0.5,
        }
    }
}

impl SectionFade {
    /// Fade multiplier for the next section's intersection ratio.
    #[must_use]
    pub fn fade(&self, ratio: f64) -> f64 {
        section_fade(ratio, self.start, self.end)
    }

    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        [("sections.start", self.start), ("sections.end", self.end)]
            .into_iter()
            .filter(|(_, v)| !(0.0..=1.0).contains(v))
            .map(|(name, v)| format!("{name} must be in [0, 1], got {v}"))
            .collect()
    }
}

/// `1` (no fade) → `0` (fully faded) as `ratio` goes from `start` to `end`.
#[must_use]
pub fn section_fade(ratio: f64, start: f64, end: f64) -> f64 {
    let t = ((ratio - start) / (end - start).max(1e-4)).clamp(0.0, 1.0);
    1.0 - t
}
