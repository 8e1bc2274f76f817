#![forbid(unsafe_code)]

//! Core: geometry primitives, frame coalescing, and shared values.
//!
//! # Role in Folio
//! `folio-core` holds the small building blocks the other crates agree on.
//! It has no knowledge of timelines or branches.
//!
//! # Primary responsibilities
//! - **Geometry**: [`Point`] and [`Rect`] in CSS pixels.
//! - **Frame coalescing**: a single-flight guard that folds a burst of
//!   scroll/resize events into one recomputation per animation frame.
//! - **Read-optimized stores**: wait-free single-writer values that many
//!   page regions read.
//! - **Logging**: optional JSON subscriber setup for hosts.
//!
//! # How it fits in the system
//! `folio-timeline` computes layout in terms of [`Point`]; `folio-web`
//! drives the scroll tracker through [`frame_coalescer::FrameCoalescer`] and
//! publishes progress through [`read_optimized::ArcSwapStore`].

pub mod frame_coalescer;
pub mod geometry;
pub mod logging;
pub mod read_optimized;

pub use geometry::{Point, Rect};
