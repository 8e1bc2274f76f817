#![forbid(unsafe_code)]

//! Frame coalescing for high-frequency scroll and resize events.
//!
//! Browsers can deliver many scroll events between two animation frames.
//! Recomputing layout for each of them wastes work, so the host schedules at
//! most one animation frame at a time and lets [`FrameCoalescer`] fold every
//! event that arrives in between.
//!
//! # Design
//!
//! The coalescer uses a "latest wins" strategy:
//! - Every event replaces the pending payload, so the final event of a burst
//!   is always the one processed.
//! - A resize anywhere in the burst is remembered even if scroll events
//!   follow it.
//! - Only the first event of a frame asks the host to schedule a frame; the
//!   rest report [`FrameRequest::AlreadyScheduled`].
//!
//! # Usage
//!
//! ```
//! use folio_core::frame_coalescer::{FrameCoalescer, FrameEvent, FrameRequest};
//!
//! let mut frames = FrameCoalescer::new();
//! assert_eq!(frames.push(FrameEvent::Scroll(10.0)), FrameRequest::Schedule);
//! assert_eq!(frames.push(FrameEvent::Scroll(20.0)), FrameRequest::AlreadyScheduled);
//!
//! // Inside the animation-frame callback:
//! let frame = frames.take().unwrap();
//! assert_eq!(frame.latest, 20.0);
//! assert_eq!(frame.events, 2);
//! assert!(!frames.is_scheduled());
//! ```
//!
//! # Invariants
//!
//! 1. At most one frame is scheduled at any time.
//! 2. `take()` returns the payload of the last pushed event.
//! 3. After `cancel()` nothing is pending and nothing is scheduled.

/// An input event that should trigger a recomputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent<T> {
    /// The document scrolled.
    Scroll(T),
    /// The viewport changed size.
    Resize(T),
}

impl<T> FrameEvent<T> {
    fn into_payload(self) -> (T, bool) {
        match self {
            Self::Scroll(p) => (p, false),
            Self::Resize(p) => (p, true),
        }
    }
}

/// What the host should do after pushing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// No frame is pending; the host must request an animation frame.
    Schedule,
    /// A frame is already pending; the event was folded into it.
    AlreadyScheduled,
}

/// The coalesced result of all events delivered within one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingFrame<T> {
    /// Payload of the most recent event.
    pub latest: T,
    /// Whether any event in the burst was a resize.
    pub resized: bool,
    /// Number of events folded into this frame.
    pub events: u32,
}

/// Single-flight animation-frame guard.
///
/// Not thread-safe; it lives on the main thread alongside the event
/// listeners that feed it.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    pending: Option<PendingFrame<T>>,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FrameCoalescer<T> {
    /// Create an idle coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event into the coalescer.
    pub fn push(&mut self, event: FrameEvent<T>) -> FrameRequest {
        let (payload, resized) = event.into_payload();
        match self.pending.as_mut() {
            Some(frame) => {
                frame.latest = payload;
                frame.resized |= resized;
                frame.events = frame.events.saturating_add(1);
                tracing::trace!(events = frame.events, "event folded into pending frame");
                FrameRequest::AlreadyScheduled
            }
            None => {
                self.pending = Some(PendingFrame {
                    latest: payload,
                    resized,
                    events: 1,
                });
                FrameRequest::Schedule
            }
        }
    }

    /// Consume the pending frame. Call from the animation-frame callback.
    ///
    /// Returns `None` if the frame was cancelled in the meantime.
    #[must_use]
    pub fn take(&mut self) -> Option<PendingFrame<T>> {
        self.pending.take()
    }

    /// Drop any pending frame (unmount).
    ///
    /// Returns `true` if a frame was scheduled, in which case the host should
    /// also cancel its animation-frame handle.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a frame is currently scheduled.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }
}
