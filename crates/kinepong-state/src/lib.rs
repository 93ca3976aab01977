//! KinePong State Engine - from landmarks to published control targets
//!
//! This crate implements the control side of the pipeline:
//! - Landmark resolution (best candidate per class, world mapping)
//! - Sticky target updates
//! - Target smoothing for paddles
//! - Liveness tracking
//! - The snapshot store read by the simulation

pub mod liveness;
pub mod resolver;
pub mod smoothing;
pub mod store;

pub use liveness::*;
pub use resolver::*;
pub use smoothing::*;
pub use store::*;
