//! KinePong Transport Layer - pose stream client
//!
//! This crate provides:
//! - Connection state machine driven by a non-blocking `poll()`
//! - WebSocket connector (tokio-tungstenite)
//! - Unconditional reconnect with exponential backoff
//! - A `Connector` seam for scripted transports in tests

pub mod backoff;
pub mod client;
pub mod connection;
pub mod error;
pub mod ws;

pub use backoff::*;
pub use client::*;
pub use connection::*;
pub use error::*;
pub use ws::*;
