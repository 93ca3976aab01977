//! KinePong Wire - Pose stream frame format
//!
//! This crate turns inbound text frames into player records:
//! - Frame decoding (JSON text -> keyed document)
//! - Typed optional field access over loosely-typed documents
//! - Pose extraction with per-limb confidence gating

pub mod access;
pub mod extract;
pub mod frame;

pub use access::*;
pub use extract::*;
pub use frame::*;
