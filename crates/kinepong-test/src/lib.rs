//! KinePong Test Harness - pipeline validation
//!
//! This crate provides:
//! - Pose frame JSON builders
//! - A scripted in-process connector
//! - A WebSocket mock pose server
//! - End-to-end pipeline scenarios

pub mod frames;
pub mod integration;
pub mod mock_server;
pub mod scripted;

pub use frames::*;
pub use integration::*;
pub use mock_server::*;
pub use scripted::*;
