//! KinePong Game - pong driven by body landmarks
//!
//! Four player paddles follow the control targets (hands and feet), one AI
//! paddle tracks the ball. The game holds whenever the pose stream is not
//! live.

pub mod game;
pub mod physics;

pub use game::*;
pub use physics::*;
