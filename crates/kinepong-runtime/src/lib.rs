//! KinePong Runtime - pipeline orchestration
//!
//! This crate wires the stages into one synchronous tick:
//! 1. Poll transport
//! 2. Decode frames
//! 3. Extract players
//! 4. Update player count
//! 5. Resolve control targets
//! 6. Stamp liveness
//! 7. Notify pose observers
//! 8. Publish the control snapshot
//!
//! It also owns configuration loading and logging setup.

pub mod config;
pub mod node;
pub mod observability;
pub mod observer;

pub use config::*;
pub use node::*;
pub use observability::*;
pub use observer::*;
