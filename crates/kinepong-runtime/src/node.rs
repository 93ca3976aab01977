//! KinePong Node - pose pipeline tick

use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use kinepong_core::{system_clock, ControlTargets, SharedClock};
use kinepong_state::{
    ControlHandle, ControlSnapshot, ControlTargetStore, LandmarkResolver, LivenessTracker,
    ResolverConfig, DEFAULT_LIVENESS_TIMEOUT,
};
use kinepong_transport::{
    ConnectionState, Connector, ReconnectPolicy, TransportClient, WsConnector, DEFAULT_ENDPOINT,
};
use kinepong_wire::{decode_frame, payload_preview, ExtractorConfig, PoseExtractor, PREVIEW_LEN};

use crate::{PoseEvent, PoseObservers, SubscriptionId};

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub endpoint: String,
    pub extractor: ExtractorConfig,
    pub resolver: ResolverConfig,
    pub reconnect: ReconnectPolicy,
    /// Default timeout for [`PoseNode::is_live`]
    pub liveness_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            extractor: ExtractorConfig::default(),
            resolver: ResolverConfig::default(),
            reconnect: ReconnectPolicy::default(),
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub payloads_received: u64,
    pub frames_decoded: u64,
    pub decode_failures: u64,
    pub frames_with_players: u64,
    pub last_tick_duration: Duration,
}

/// Pose pipeline node.
///
/// Single writer of the control store. Call [`tick`](Self::tick) once per
/// simulation frame.
pub struct PoseNode {
    config: NodeConfig,
    transport: TransportClient,
    extractor: PoseExtractor,
    resolver: LandmarkResolver,
    liveness: LivenessTracker,
    store: ControlTargetStore,
    observers: PoseObservers,
    targets: ControlTargets,
    player_count: usize,
    frame_sequence: u64,
    stats: RuntimeStats,
}

impl PoseNode {
    pub fn new(config: NodeConfig, connector: Box<dyn Connector>) -> Self {
        Self::with_clock(config, connector, system_clock())
    }

    pub fn with_clock(config: NodeConfig, connector: Box<dyn Connector>, clock: SharedClock) -> Self {
        let transport = TransportClient::with_clock(
            config.endpoint.clone(),
            connector,
            config.reconnect.clone(),
            clock.clone(),
        );

        PoseNode {
            extractor: PoseExtractor::new(config.extractor),
            resolver: LandmarkResolver::new(config.resolver),
            liveness: LivenessTracker::new(clock.clone()),
            store: ControlTargetStore::new(clock),
            observers: PoseObservers::new(),
            targets: ControlTargets::new(),
            player_count: 0,
            frame_sequence: 0,
            stats: RuntimeStats::default(),
            transport,
            config,
        }
    }

    /// Node over a WebSocket connector spawning on `runtime`
    pub fn websocket(config: NodeConfig, runtime: Handle) -> Self {
        Self::new(config, Box::new(WsConnector::new(runtime)))
    }

    /// Start connecting. Reconnects happen automatically from `tick`.
    pub fn connect(&mut self) {
        self.transport.connect();
    }

    /// Execute one tick of the pipeline
    pub fn tick(&mut self) {
        let start = Instant::now();
        self.stats.ticks += 1;

        // Stage 1: Poll transport
        let payloads = self.transport.poll();

        // Stages 2-7, per frame in arrival order
        for payload in &payloads {
            self.process_payload(payload);
        }

        // Stage 8: Publish
        self.publish();

        self.stats.last_tick_duration = start.elapsed();
    }

    fn process_payload(&mut self, payload: &str) {
        self.stats.payloads_received += 1;

        // Stage 2: Decode
        let doc = match decode_frame(payload) {
            Ok(doc) => doc,
            Err(err) => {
                self.stats.decode_failures += 1;
                warn!(
                    error = %err,
                    payload = payload_preview(payload, PREVIEW_LEN),
                    "dropping undecodable frame"
                );
                return;
            }
        };
        self.stats.frames_decoded += 1;
        self.frame_sequence += 1;

        // Stage 3: Extract
        let extraction = self.extractor.extract(&doc);

        // Stage 4: Player count
        self.player_count = extraction.player_count();
        if self.player_count == 0 {
            debug!(sequence = self.frame_sequence, "frame has no players");
            return;
        }
        self.stats.frames_with_players += 1;

        // Stage 5: Liveness
        self.liveness.record_frame();

        // Stage 6: Resolve the primary player
        let Some(primary) = extraction.primary() else {
            debug!(
                sequence = self.frame_sequence,
                players = self.player_count,
                "first player entry is not a mapping"
            );
            return;
        };
        let updated = self.resolver.update(&mut self.targets, primary);

        debug!(
            sequence = self.frame_sequence,
            players = self.player_count,
            targets_updated = updated,
            "frame processed"
        );

        // Stage 7: Observers
        if !self.observers.is_empty() {
            self.observers.notify(&PoseEvent {
                sequence: self.frame_sequence,
                players: extraction.players,
            });
        }
    }

    fn publish(&self) {
        self.store.publish(ControlSnapshot {
            targets: self.targets,
            player_count: self.player_count,
            server_connected: self.transport.is_open(),
            last_valid_frame: self.liveness.last_valid(),
            sequence: 0,
        });
    }

    /// Consumer view of the published state
    pub fn handle(&self) -> ControlHandle {
        self.store.handle()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&PoseEvent) + Send + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Close the connection and stop reconnecting. Publishes the
    /// disconnected state.
    pub fn shutdown(&mut self) {
        self.transport.close();
        self.publish();
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    pub fn control_targets(&self) -> ControlTargets {
        self.targets
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Live against the configured timeout
    pub fn is_live(&self) -> bool {
        self.liveness.is_live(self.config.liveness_timeout)
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }
}
