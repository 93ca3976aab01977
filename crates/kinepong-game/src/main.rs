//! KinePong
//!
//! Connects to a pose server and plays pong with the detected body.
//!
//! Usage: `kinepong [config.json]` (defaults to `kinepong.json`; a missing
//! file means built-in defaults).

use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use kinepong_core::LandmarkClass;
use kinepong_game::{ControlInput, GameEvent, PhysicsConfig, PongGame};
use kinepong_runtime::{init_logging, KinepongConfig, PoseNode};

const DEFAULT_CONFIG_PATH: &str = "kinepong.json";
const STATUS_EVERY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = KinepongConfig::load_or_default(&path)?;
    init_logging(&config.logging)?;
    info!(config = %path, endpoint = %config.endpoint, "starting kinepong");

    let mut node = PoseNode::websocket(config.node_config(), Handle::current());
    let handle = node.handle();
    node.connect();

    let physics = PhysicsConfig {
        world_width: config.world.width,
        world_height: config.world.height,
        margin: config.smoothing.margin,
        ..PhysicsConfig::default()
    };
    let mut game = PongGame::new(physics, config.smoother());

    let mut ticker = interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_step = Instant::now();
    let mut last_status = Instant::now();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!(error = %e, "ctrl-c handler failed");
                }
                break;
            }
        }

        node.tick();

        let now = Instant::now();
        let dt = now.duration_since(last_step).as_secs_f32();
        last_step = now;
        game.step(dt, &ControlInput::from_handle(&handle, config.liveness_timeout));

        for event in game.drain_events() {
            if let GameEvent::ScoreUpdated { player, ai } = event {
                info!(player, ai, "score");
            }
        }

        if now.duration_since(last_status) >= STATUS_EVERY {
            last_status = now;
            let snapshot = handle.snapshot();
            info!(
                status = %game.status(),
                connected = snapshot.server_connected,
                players = snapshot.player_count,
                left_hand = %game.paddle(LandmarkClass::LeftHand),
                right_hand = %game.paddle(LandmarkClass::RightHand),
                left_foot = %game.paddle(LandmarkClass::LeftFoot),
                right_foot = %game.paddle(LandmarkClass::RightFoot),
                frames = node.stats().frames_decoded,
                decode_failures = node.stats().decode_failures,
                "status"
            );
        }
    }

    game.end();
    node.shutdown();
    info!(
        player = game.score().player,
        ai = game.score().ai,
        "kinepong stopped"
    );
    Ok(())
}
