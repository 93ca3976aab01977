//! KinePong Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every stage of the pose pipeline:
//! - Geometry (Point2, WorldPoint)
//! - Landmarks and per-player records
//! - Control targets (the four paddle channels)
//! - Monotonic clocks
//! - Error types

pub mod control;
pub mod error;
pub mod geometry;
pub mod landmark;
pub mod time;

pub use control::*;
pub use error::*;
pub use geometry::*;
pub use landmark::*;
pub use time::*;
