//! Pong game state
//!
//! The host calls [`PongGame::step`] once per frame with the current control
//! input. Nothing moves while the game is inactive or the stream is not
//! live.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_4;
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use kinepong_core::{ControlTargets, LandmarkClass, WorldPoint};
use kinepong_state::{ControlHandle, TargetSmoother};

use crate::{paddle_rect, track_ball, Ball, Deflect, Exit, PhysicsConfig};

/// Notifications for the host, drained with [`PongGame::drain_events`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Ended,
    ScoreUpdated { player: u32, ai: u32 },
}

/// What the host should display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Ended, waiting for a restart
    Idle,
    /// Active but no live pose stream
    NoPlayer,
    Playing,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameStatus::Idle => "game over",
            GameStatus::NoPlayer => "no player found",
            GameStatus::Playing => "playing",
        };
        f.write_str(text)
    }
}

/// Control input for one step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlInput {
    pub targets: ControlTargets,
    pub live: bool,
    pub player_count: usize,
}

impl ControlInput {
    /// Read the handle's latest snapshot
    pub fn from_handle(handle: &ControlHandle, liveness_timeout: Duration) -> Self {
        let snapshot = handle.snapshot();
        ControlInput {
            targets: snapshot.targets,
            live: handle.is_live(liveness_timeout),
            player_count: snapshot.player_count,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub player: u32,
    pub ai: u32,
}

/// Pong simulation
pub struct PongGame {
    physics: PhysicsConfig,
    smoother: TargetSmoother,
    rng: StdRng,
    ball: Ball,
    /// Indexed by [`LandmarkClass::index`]
    paddles: [WorldPoint; 4],
    ai_paddle: WorldPoint,
    score: Score,
    active: bool,
    status: GameStatus,
    player_count: usize,
    events: VecDeque<GameEvent>,
}

impl PongGame {
    pub fn new(physics: PhysicsConfig, smoother: TargetSmoother) -> Self {
        Self::with_rng(physics, smoother, StdRng::from_entropy())
    }

    /// Deterministic game for replays and tests
    pub fn with_seed(physics: PhysicsConfig, smoother: TargetSmoother, seed: u64) -> Self {
        Self::with_rng(physics, smoother, StdRng::seed_from_u64(seed))
    }

    fn with_rng(physics: PhysicsConfig, smoother: TargetSmoother, rng: StdRng) -> Self {
        let mut game = PongGame {
            ball: Ball::launched(physics.center(), physics.ball_speed, FRAC_PI_4),
            paddles: [WorldPoint::ZERO; 4],
            ai_paddle: physics.center(),
            score: Score::default(),
            active: false,
            status: GameStatus::Idle,
            player_count: 0,
            events: VecDeque::new(),
            physics,
            smoother,
            rng,
        };
        game.start();
        game
    }

    fn start(&mut self) {
        let w = self.physics.world_width;
        let h = self.physics.world_height;
        let center = self.physics.center();

        self.ball = Ball::launched(center, self.physics.ball_speed, FRAC_PI_4);
        self.paddles[LandmarkClass::LeftHand.index()] = WorldPoint::new(100.0, h / 2.0);
        self.paddles[LandmarkClass::RightHand.index()] = WorldPoint::new(w - 100.0, h / 2.0);
        self.paddles[LandmarkClass::LeftFoot.index()] = WorldPoint::new(100.0, h * 0.75);
        self.paddles[LandmarkClass::RightFoot.index()] = WorldPoint::new(w - 100.0, h * 0.75);
        self.ai_paddle = center;

        self.active = true;
        self.status = GameStatus::NoPlayer;
        self.push_score();
        self.events.push_back(GameEvent::Started);
        info!("game started");
    }

    /// Zero the score and start over
    pub fn restart(&mut self) {
        self.score = Score::default();
        self.start();
    }

    /// Stop the game. Steps become no-ops until `restart`.
    pub fn end(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.status = GameStatus::Idle;
        self.events.push_back(GameEvent::Ended);
        info!(player = self.score.player, ai = self.score.ai, "game ended");
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f32, input: &ControlInput) {
        if !self.active {
            return;
        }
        if !input.live {
            self.status = GameStatus::NoPlayer;
            self.player_count = 0;
            return;
        }
        self.status = GameStatus::Playing;
        self.player_count = input.player_count;

        for class in LandmarkClass::all() {
            let slot = &mut self.paddles[class.index()];
            *slot = self.smoother.step(*slot, input.targets.get(*class));
        }

        self.ball.advance(dt, &self.physics);
        self.ai_paddle = track_ball(self.ai_paddle, &self.ball, dt, &self.physics);
        self.collide();
    }

    fn collide(&mut self) {
        let ball_rect = self.ball.rect(&self.physics);

        for paddle in self.paddles {
            if ball_rect.intersects(&paddle_rect(paddle, &self.physics)) {
                self.ball.deflect(Deflect::Right, &self.physics, &mut self.rng);
            }
        }
        if ball_rect.intersects(&paddle_rect(self.ai_paddle, &self.physics)) {
            self.ball.deflect(Deflect::Left, &self.physics, &mut self.rng);
        }

        match self.ball.exit(&self.physics) {
            Some(Exit::Left) => {
                self.score.ai += 1;
                self.serve();
            }
            Some(Exit::Right) => {
                self.score.player += 1;
                self.serve();
            }
            None => {}
        }
    }

    /// Recentre the ball and serve toward the trailing side
    fn serve(&mut self) {
        let angle = self.rng.gen_range(-FRAC_PI_4..=FRAC_PI_4);
        self.ball = Ball::launched(self.physics.center(), self.physics.ball_speed, angle);
        let vx = self.ball.velocity.x.abs();
        self.ball.velocity.x = if self.score.player > self.score.ai { -vx } else { vx };

        debug!(player = self.score.player, ai = self.score.ai, "point scored");
        self.push_score();
    }

    fn push_score(&mut self) {
        self.events.push_back(GameEvent::ScoreUpdated {
            player: self.score.player,
            ai: self.score.ai,
        });
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self, class: LandmarkClass) -> WorldPoint {
        self.paddles[class.index()]
    }

    pub fn ai_paddle(&self) -> WorldPoint {
        self.ai_paddle
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinepong_core::Point2;

    fn game() -> PongGame {
        PongGame::with_seed(PhysicsConfig::default(), TargetSmoother::default(), 42)
    }

    fn live(targets: ControlTargets) -> ControlInput {
        ControlInput {
            targets,
            live: true,
            player_count: 1,
        }
    }

    #[test]
    fn test_initial_layout() {
        let mut game = game();
        assert!(game.is_active());
        assert_eq!(game.ball().position, WorldPoint::new(960.0, 540.0));
        assert_eq!(game.paddle(LandmarkClass::LeftHand), WorldPoint::new(100.0, 540.0));
        assert_eq!(game.paddle(LandmarkClass::RightHand), WorldPoint::new(1820.0, 540.0));
        assert_eq!(game.ai_paddle(), WorldPoint::new(960.0, 540.0));
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::ScoreUpdated { player: 0, ai: 0 }, GameEvent::Started]
        );
    }

    #[test]
    fn test_holds_when_not_live() {
        let mut game = game();
        let before = *game.ball();
        game.step(0.1, &ControlInput::default());

        assert_eq!(*game.ball(), before);
        assert_eq!(game.status(), GameStatus::NoPlayer);
        assert_eq!(game.player_count(), 0);
    }

    #[test]
    fn test_paddles_follow_targets() {
        let mut game = game();
        let mut targets = ControlTargets::new();
        targets.set(LandmarkClass::LeftHand, WorldPoint::new(200.0, 640.0));

        game.step(0.0, &live(targets));
        let p = game.paddle(LandmarkClass::LeftHand);
        assert!((p.x - 110.0).abs() < 1e-3);
        assert!((p.y - 550.0).abs() < 1e-3);
        assert_eq!(game.paddle(LandmarkClass::RightHand), WorldPoint::new(1820.0, 540.0));
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_ai_scores_on_left_exit() {
        let mut game = game();
        game.drain_events();
        game.ball = Ball {
            position: WorldPoint::new(5.0, 540.0),
            velocity: Point2::new(-400.0, 0.0),
        };
        // Keep paddles away from the ball
        game.paddles = [WorldPoint::new(900.0, 100.0); 4];

        game.step(0.05, &live(ControlTargets::new()));

        assert_eq!(game.score(), Score { player: 0, ai: 1 });
        assert_eq!(game.ball().position, WorldPoint::new(960.0, 540.0));
        // Player trails, so the serve goes right
        assert!(game.ball().velocity.x > 0.0);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::ScoreUpdated { player: 0, ai: 1 }]
        );
    }

    #[test]
    fn test_player_scores_on_right_exit_and_serve_turns() {
        let mut game = game();
        game.ball = Ball {
            position: WorldPoint::new(1915.0, 300.0),
            velocity: Point2::new(400.0, 0.0),
        };
        game.paddles = [WorldPoint::new(900.0, 100.0); 4];
        game.ai_paddle = WorldPoint::new(960.0, 900.0);

        game.step(0.05, &live(ControlTargets::new()));

        assert_eq!(game.score(), Score { player: 1, ai: 0 });
        assert!(game.ball().velocity.x < 0.0);
        let angle = game.ball().velocity.y.atan2(-game.ball().velocity.x).abs();
        assert!(angle <= FRAC_PI_4 + 1e-4);
    }

    #[test]
    fn test_player_paddle_sends_ball_right() {
        let mut game = game();
        game.ball = Ball {
            position: WorldPoint::new(112.0, 540.0),
            velocity: Point2::new(-400.0, 0.0),
        };

        game.step(0.001, &live(ControlTargets::new()));

        assert!(game.ball().velocity.x > 0.0);
        assert!((game.ball().velocity.length() - 400.0).abs() < 1e-2);
    }

    #[test]
    fn test_end_and_restart() {
        let mut game = game();
        game.score = Score { player: 3, ai: 2 };
        game.end();
        game.end();
        assert!(!game.is_active());
        assert_eq!(game.status(), GameStatus::Idle);

        let before = *game.ball();
        game.step(0.1, &live(ControlTargets::new()));
        assert_eq!(*game.ball(), before);

        game.drain_events();
        game.restart();
        assert_eq!(game.score(), Score::default());
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::ScoreUpdated { player: 0, ai: 0 }, GameEvent::Started]
        );
    }
}
