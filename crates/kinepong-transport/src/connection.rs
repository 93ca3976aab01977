//! Connection primitives shared by all connectors

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::TransportResult;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Event reported by a socket task, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed
    Opened,
    /// Inbound UTF-8 text frame
    Message(String),
    /// Remote started the close handshake
    Closing,
    /// Connection is gone (remote close, error or connect failure)
    Closed { reason: Option<String> },
}

/// Event receiver channel
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Event sender channel
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// One live connection attempt
pub struct ConnectionHandle {
    events: EventReceiver,
    task: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    /// Handle backed by a spawned socket task
    pub fn new(events: EventReceiver, task: JoinHandle<()>) -> Self {
        ConnectionHandle {
            events,
            task: Some(task),
        }
    }

    /// Handle with no task behind it (scripted transports)
    pub fn detached(events: EventReceiver) -> Self {
        ConnectionHandle { events, task: None }
    }

    /// Non-blocking receive
    pub fn try_recv(&mut self) -> Result<TransportEvent, mpsc::error::TryRecvError> {
        self.events.try_recv()
    }

    /// Stop the socket task. Buffered events are discarded.
    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events.close();
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

/// Starts connection attempts.
///
/// `connect` must not block: it starts the attempt and returns a handle
/// whose events report the outcome.
pub trait Connector: Send {
    fn connect(&mut self, url: &str) -> TransportResult<ConnectionHandle>;
}

/// Create a connected event channel pair
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
