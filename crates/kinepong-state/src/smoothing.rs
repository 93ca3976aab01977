//! Paddle smoothing
//!
//! Paddles follow their control target with a per-frame lerp, the target
//! first clamped to the play area minus a margin.

use kinepong_core::{Point2, WorldPoint};

/// Default lerp factor per simulation step
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.1;

/// Default distance kept between a paddle and the world edge
pub const DEFAULT_EDGE_MARGIN: f32 = 50.0;

/// Smooths a paddle toward a target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSmoother {
    factor: f32,
    margin: f32,
    world: Point2,
}

impl TargetSmoother {
    /// Factor is clamped to [0, 1]. Margin is clamped so that the play area
    /// never inverts.
    pub fn new(factor: f32, margin: f32, world_width: f32, world_height: f32) -> Self {
        let world = Point2::new(world_width.max(0.0), world_height.max(0.0));
        let max_margin = world.x.min(world.y) / 2.0;
        TargetSmoother {
            factor: if factor.is_finite() { factor.clamp(0.0, 1.0) } else { DEFAULT_SMOOTHING_FACTOR },
            margin: margin.clamp(0.0, max_margin),
            world,
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Clamp a target into the playable area
    pub fn bound(&self, target: WorldPoint) -> WorldPoint {
        target.clamp(
            Point2::new(self.margin, self.margin),
            Point2::new(self.world.x - self.margin, self.world.y - self.margin),
        )
    }

    /// One smoothing step. An unresolved target leaves the paddle in place.
    pub fn step(&self, current: WorldPoint, target: Option<WorldPoint>) -> WorldPoint {
        match target {
            Some(target) => current.lerp(self.bound(target), self.factor),
            None => current,
        }
    }
}

impl Default for TargetSmoother {
    fn default() -> Self {
        TargetSmoother::new(DEFAULT_SMOOTHING_FACTOR, DEFAULT_EDGE_MARGIN, 1920.0, 1080.0)
    }
}
