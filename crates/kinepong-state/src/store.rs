//! Control target store
//!
//! The pipeline is the single writer. It publishes whole snapshots, so a
//! reader always sees targets, player count, connection flag and liveness
//! stamp from the same update.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kinepong_core::{ControlTargets, LandmarkClass, SharedClock, WorldPoint};
use parking_lot::RwLock;
use tracing::trace;

use crate::is_live_at;

/// One published pipeline state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlSnapshot {
    pub targets: ControlTargets,
    pub player_count: usize,
    pub server_connected: bool,
    pub last_valid_frame: Option<Instant>,
    /// Increments on every publish
    pub sequence: u64,
}

impl ControlSnapshot {
    #[inline]
    pub fn target(&self, class: LandmarkClass) -> Option<WorldPoint> {
        self.targets.get(class)
    }
}

/// Writer side of the store
pub struct ControlTargetStore {
    current: Arc<RwLock<Arc<ControlSnapshot>>>,
    clock: SharedClock,
}

impl ControlTargetStore {
    pub fn new(clock: SharedClock) -> Self {
        ControlTargetStore {
            current: Arc::new(RwLock::new(Arc::new(ControlSnapshot::default()))),
            clock,
        }
    }

    /// Replace the published state. The sequence number is assigned here.
    pub fn publish(&self, mut snapshot: ControlSnapshot) -> u64 {
        let mut guard = self.current.write();
        snapshot.sequence = guard.sequence + 1;
        let sequence = snapshot.sequence;
        *guard = Arc::new(snapshot);
        trace!(sequence, "published control snapshot");
        sequence
    }

    pub fn read(&self) -> Arc<ControlSnapshot> {
        self.current.read().clone()
    }

    /// Read side for the simulation
    pub fn handle(&self) -> ControlHandle {
        ControlHandle {
            current: self.current.clone(),
            clock: self.clock.clone(),
        }
    }
}

/// Cloneable read-only view of the store
#[derive(Clone)]
pub struct ControlHandle {
    current: Arc<RwLock<Arc<ControlSnapshot>>>,
    clock: SharedClock,
}

impl ControlHandle {
    /// Latest consistent snapshot
    pub fn snapshot(&self) -> Arc<ControlSnapshot> {
        self.current.read().clone()
    }

    pub fn control_targets(&self) -> ControlTargets {
        self.snapshot().targets
    }

    pub fn is_server_connected(&self) -> bool {
        self.snapshot().server_connected
    }

    pub fn player_count(&self) -> usize {
        self.snapshot().player_count
    }

    /// True when a valid frame arrived strictly less than `timeout` ago
    pub fn is_live(&self, timeout: Duration) -> bool {
        is_live_at(self.snapshot().last_valid_frame, self.clock.now(), timeout)
    }
}

impl std::fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlHandle")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
