//! Scripted connector
//!
//! In-process [`Connector`] whose socket events are pushed by the test.

use std::sync::Arc;

use parking_lot::Mutex;

use kinepong_transport::{
    event_channel, ConnectionHandle, Connector, EventSender, TransportError, TransportEvent,
    TransportResult,
};

#[derive(Default)]
struct Script {
    attempts: Vec<EventSender>,
    refuse: bool,
}

/// Cloneable connector; clones drive the same script
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect attempts seen so far
    pub fn attempts(&self) -> usize {
        self.script.lock().attempts.len()
    }

    /// Make subsequent `connect` calls fail synchronously
    pub fn refuse(&self, refuse: bool) {
        self.script.lock().refuse = refuse;
    }

    fn emit(&self, event: TransportEvent) -> bool {
        let script = self.script.lock();
        match script.attempts.last() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Complete the handshake of the latest attempt
    pub fn open(&self) -> bool {
        self.emit(TransportEvent::Opened)
    }

    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.emit(TransportEvent::Message(text.into()))
    }

    /// Remote close of the latest attempt
    pub fn close(&self, reason: Option<&str>) -> bool {
        self.emit(TransportEvent::Closing);
        self.emit(TransportEvent::Closed {
            reason: reason.map(str::to_string),
        })
    }
}

impl Connector for ScriptedConnector {
    fn connect(&mut self, _url: &str) -> TransportResult<ConnectionHandle> {
        let mut script = self.script.lock();
        let (tx, rx) = event_channel();
        script.attempts.push(tx);
        if script.refuse {
            return Err(TransportError::Connect("refused by script".into()));
        }
        Ok(ConnectionHandle::detached(rx))
    }
}
