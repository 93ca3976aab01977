//! End-to-end pipeline scenarios
//!
//! [`ScriptedPipeline`] runs a real [`PoseNode`] over a scripted connector
//! and a manual clock. The WebSocket scenarios at the bottom run the same
//! node against [`MockPoseServer`](crate::MockPoseServer).

use std::sync::Arc;
use std::time::Duration;

use kinepong_core::ManualClock;
use kinepong_runtime::{NodeConfig, PoseNode};
use kinepong_state::ControlSnapshot;
use kinepong_transport::ReconnectPolicy;

use crate::ScriptedConnector;

// ============================================================================
// SCRIPTED PIPELINE
// ============================================================================

/// Node, connector and clock wired together
pub struct ScriptedPipeline {
    pub node: PoseNode,
    pub connector: ScriptedConnector,
    pub clock: ManualClock,
}

impl ScriptedPipeline {
    /// Connected and open, after one tick
    pub fn open() -> Self {
        Self::open_with(NodeConfig {
            reconnect: ReconnectPolicy {
                jitter: false,
                ..ReconnectPolicy::default()
            },
            ..NodeConfig::default()
        })
    }

    pub fn open_with(config: NodeConfig) -> Self {
        let connector = ScriptedConnector::new();
        let clock = ManualClock::new();
        let mut node =
            PoseNode::with_clock(config, Box::new(connector.clone()), Arc::new(clock.clone()));
        node.connect();
        connector.open();
        node.tick();
        ScriptedPipeline {
            node,
            connector,
            clock,
        }
    }

    /// Deliver one frame and tick
    pub fn feed(&mut self, text: &str) -> Arc<ControlSnapshot> {
        self.connector.send_text(text);
        self.node.tick();
        self.node.handle().snapshot()
    }

    /// Deliver several frames in one tick
    pub fn feed_all<I, S>(&mut self, frames: I) -> Arc<ControlSnapshot>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for text in frames {
            self.connector.send_text(text);
        }
        self.node.tick();
        self.node.handle().snapshot()
    }

    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
    }
}

/// Tick `node` until `done` holds or `timeout` elapses, yielding to the
/// runtime between ticks
pub async fn tick_until<F>(node: &mut PoseNode, timeout: Duration, mut done: F) -> bool
where
    F: FnMut(&PoseNode) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        node.tick();
        if done(node) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
