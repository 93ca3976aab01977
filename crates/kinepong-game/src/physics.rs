//! Ball and paddle physics

use rand::Rng;

use kinepong_core::{Point2, Rect2, WorldPoint};

/// Physics constants
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub world_width: f32,
    pub world_height: f32,
    /// Ball speed, world units per second
    pub ball_speed: f32,
    pub ai_speed: f32,
    pub ball_half_size: f32,
    pub paddle_half_extents: Point2,
    /// Distance kept between paddle targets and the world edge
    pub margin: f32,
    /// Maximum vertical nudge applied on a paddle hit
    pub hit_nudge: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            world_width: 1920.0,
            world_height: 1080.0,
            ball_speed: 400.0,
            ai_speed: 250.0,
            ball_half_size: 10.0,
            paddle_half_extents: Point2::new(10.0, 50.0),
            margin: 50.0,
            hit_nudge: 50.0,
        }
    }
}

impl PhysicsConfig {
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.world_width / 2.0, self.world_height / 2.0)
    }
}

/// Which side a paddle sends the ball toward
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deflect {
    /// Player paddles send the ball right
    Right,
    /// The AI paddle sends it left
    Left,
}

/// Which side scored when the ball left the field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// Ball passed the left edge: AI scores
    Left,
    /// Ball passed the right edge: player scores
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub position: WorldPoint,
    pub velocity: Point2,
}

impl Ball {
    /// Ball at `position` moving at `speed` along `angle` radians
    pub fn launched(position: WorldPoint, speed: f32, angle: f32) -> Self {
        Ball {
            position,
            velocity: Point2::new(speed, 0.0).rotated(angle),
        }
    }

    pub fn rect(&self, config: &PhysicsConfig) -> Rect2 {
        let half = config.ball_half_size;
        Rect2::centered(self.position, Point2::new(half, half))
    }

    /// Move and bounce off the top and bottom walls
    pub fn advance(&mut self, dt: f32, config: &PhysicsConfig) {
        self.position = self.position + self.velocity * dt;

        if self.position.y <= 0.0 || self.position.y >= config.world_height {
            self.velocity.y = -self.velocity.y;
            self.position.y = self.position.y.clamp(0.0, config.world_height);
        }
    }

    /// Send the ball away from a paddle with a random vertical nudge, then
    /// restore the configured speed
    pub fn deflect<R: Rng>(&mut self, toward: Deflect, config: &PhysicsConfig, rng: &mut R) {
        let vx = self.velocity.x.abs();
        self.velocity.x = match toward {
            Deflect::Right => vx,
            Deflect::Left => -vx,
        };
        if config.hit_nudge > 0.0 {
            self.velocity.y += rng.gen_range(-config.hit_nudge..=config.hit_nudge);
        }
        self.velocity = self.velocity.normalized() * config.ball_speed;
    }

    pub fn exit(&self, config: &PhysicsConfig) -> Option<Exit> {
        if self.position.x <= 0.0 {
            Some(Exit::Left)
        } else if self.position.x >= config.world_width {
            Some(Exit::Right)
        } else {
            None
        }
    }
}

pub fn paddle_rect(position: WorldPoint, config: &PhysicsConfig) -> Rect2 {
    Rect2::centered(position, config.paddle_half_extents)
}

/// AI paddle: lerp y toward the ball, x fixed
pub fn track_ball(paddle: WorldPoint, ball: &Ball, dt: f32, config: &PhysicsConfig) -> WorldPoint {
    let target = ball
        .position
        .y
        .clamp(config.margin, config.world_height - config.margin);
    let t = (config.ai_speed * dt / 100.0).clamp(0.0, 1.0);
    WorldPoint::new(paddle.x, paddle.y + (target - paddle.y) * t)
}
