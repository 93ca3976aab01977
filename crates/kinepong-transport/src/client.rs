//! Transport client - connection lifecycle driven by `poll()`
//!
//! `poll()` is called once per simulation tick. It never blocks: it drains
//! whatever the socket task has buffered, applies state transitions in
//! arrival order and hands back the text payloads in the same order.
//! A Closed transition schedules a reconnect; the client never gives up.

use std::time::Instant;

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use kinepong_core::{system_clock, SharedClock};

use crate::{ConnectionHandle, ConnectionState, Connector, ReconnectPolicy, TransportEvent};

/// Transport counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub connect_attempts: u64,
    pub opens: u64,
    pub closes: u64,
    pub messages: u64,
}

/// Pose stream client
pub struct TransportClient {
    url: String,
    connector: Box<dyn Connector>,
    policy: ReconnectPolicy,
    clock: SharedClock,
    state: ConnectionState,
    connection: Option<ConnectionHandle>,
    /// Reconnect after Closed
    auto_reconnect: bool,
    /// Current attempt reached Open
    opened_this_attempt: bool,
    /// Attempts in a row that closed without opening
    consecutive_failures: u32,
    next_attempt_at: Option<Instant>,
    last_close_reason: Option<String>,
    stats: TransportStats,
}

impl TransportClient {
    pub fn new(url: impl Into<String>, connector: Box<dyn Connector>, policy: ReconnectPolicy) -> Self {
        Self::with_clock(url, connector, policy, system_clock())
    }

    pub fn with_clock(
        url: impl Into<String>,
        connector: Box<dyn Connector>,
        policy: ReconnectPolicy,
        clock: SharedClock,
    ) -> Self {
        TransportClient {
            url: url.into(),
            connector,
            policy,
            clock,
            state: ConnectionState::Closed,
            connection: None,
            auto_reconnect: false,
            opened_this_attempt: false,
            consecutive_failures: 0,
            next_attempt_at: None,
            last_close_reason: None,
            stats: TransportStats::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn connect_attempts(&self) -> u64 {
        self.stats.connect_attempts
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    pub fn last_close_reason(&self) -> Option<&str> {
        self.last_close_reason.as_deref()
    }

    /// Start connecting and enable auto-reconnect.
    /// No-op while an attempt is already in flight or open.
    pub fn connect(&mut self) {
        self.auto_reconnect = true;
        if self.state == ConnectionState::Closed {
            self.start_attempt();
        }
    }

    /// Close the connection and stop reconnecting
    pub fn close(&mut self) {
        self.auto_reconnect = false;
        self.next_attempt_at = None;
        if let Some(mut connection) = self.connection.take() {
            connection.abort();
        }
        if self.state != ConnectionState::Closed {
            info!(url = %self.url, "pose stream closed locally");
            self.state = ConnectionState::Closed;
            self.stats.closes += 1;
        }
    }

    /// Advance the connection and drain buffered messages
    pub fn poll(&mut self) -> Vec<String> {
        if self.state == ConnectionState::Closed && self.reconnect_due() {
            self.start_attempt();
        }

        let mut messages = Vec::new();
        self.drain_events(&mut messages);
        messages
    }

    fn reconnect_due(&self) -> bool {
        if !self.auto_reconnect {
            return false;
        }
        match self.next_attempt_at {
            Some(at) => self.clock.now() >= at,
            None => true,
        }
    }

    fn start_attempt(&mut self) {
        self.stats.connect_attempts += 1;
        self.state = ConnectionState::Connecting;
        self.opened_this_attempt = false;
        self.next_attempt_at = None;
        debug!(url = %self.url, attempt = self.stats.connect_attempts, "connecting to pose stream");

        match self.connector.connect(&self.url) {
            Ok(handle) => self.connection = Some(handle),
            Err(err) => {
                warn!(url = %self.url, error = %err, "pose stream connect failed");
                self.enter_closed(Some(err.to_string()));
            }
        }
    }

    fn drain_events(&mut self, messages: &mut Vec<String>) {
        loop {
            let Some(connection) = self.connection.as_mut() else {
                return;
            };

            let event = match connection.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => TransportEvent::Closed {
                    reason: Some("socket task ended".to_string()),
                },
            };

            match event {
                TransportEvent::Opened => {
                    info!(url = %self.url, "pose stream open");
                    self.state = ConnectionState::Open;
                    self.opened_this_attempt = true;
                    self.consecutive_failures = 0;
                    self.stats.opens += 1;
                }
                TransportEvent::Message(text) => {
                    self.stats.messages += 1;
                    messages.push(text);
                }
                TransportEvent::Closing => {
                    debug!(url = %self.url, "pose stream closing");
                    self.state = ConnectionState::Closing;
                }
                TransportEvent::Closed { reason } => {
                    self.enter_closed(reason);
                    return;
                }
            }
        }
    }

    fn enter_closed(&mut self, reason: Option<String>) {
        self.connection = None;
        self.state = ConnectionState::Closed;
        self.stats.closes += 1;

        let delay = self.policy.delay_for(self.consecutive_failures);
        if !self.opened_this_attempt {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }
        self.next_attempt_at = Some(self.clock.now() + delay);

        info!(
            url = %self.url,
            reason = reason.as_deref().unwrap_or("none"),
            retry_in_ms = delay.as_millis() as u64,
            "pose stream closed"
        );
        self.last_close_reason = reason;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_channel, EventSender, TransportError, TransportResult};
    use kinepong_core::ManualClock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    /// Connector whose channels are driven by the test
    #[derive(Clone, Default)]
    struct ScriptedConnector {
        senders: Arc<Mutex<Vec<EventSender>>>,
        fail_sync: Arc<Mutex<bool>>,
    }

    impl ScriptedConnector {
        fn attempts(&self) -> usize {
            self.senders.lock().len()
        }

        fn latest(&self) -> EventSender {
            self.senders.lock().last().cloned().unwrap()
        }
    }

    impl Connector for ScriptedConnector {
        fn connect(&mut self, _url: &str) -> TransportResult<ConnectionHandle> {
            let (tx, rx) = event_channel();
            self.senders.lock().push(tx);
            if *self.fail_sync.lock() {
                return Err(TransportError::Connect("refused".into()));
            }
            Ok(ConnectionHandle::detached(rx))
        }
    }

    fn client(connector: &ScriptedConnector, policy: ReconnectPolicy) -> (TransportClient, ManualClock) {
        let clock = ManualClock::new();
        let client = TransportClient::with_clock(
            "ws://localhost:8080",
            Box::new(connector.clone()),
            policy,
            Arc::new(clock.clone()),
        );
        (client, clock)
    }

    fn no_jitter() -> ReconnectPolicy {
        ReconnectPolicy {
            jitter: false,
            ..ReconnectPolicy::default()
        }
    }

    #[test]
    fn test_connect_then_open() {
        let connector = ScriptedConnector::default();
        let (mut client, _) = client(&connector, no_jitter());
        assert_eq!(client.state(), ConnectionState::Closed);

        client.connect();
        assert_eq!(client.state(), ConnectionState::Connecting);
        assert_eq!(connector.attempts(), 1);

        connector.latest().send(TransportEvent::Opened).unwrap();
        assert!(client.poll().is_empty());
        assert!(client.is_open());
    }

    #[test]
    fn test_messages_in_order() {
        let connector = ScriptedConnector::default();
        let (mut client, _) = client(&connector, no_jitter());
        client.connect();

        let tx = connector.latest();
        tx.send(TransportEvent::Opened).unwrap();
        for i in 0..5 {
            tx.send(TransportEvent::Message(format!("m{i}"))).unwrap();
        }

        let messages = client.poll();
        assert_eq!(messages, vec!["m0", "m1", "m2", "m3", "m4"]);
        assert_eq!(client.stats().messages, 5);
        assert!(client.poll().is_empty());
    }

    #[test]
    fn test_closed_triggers_exactly_one_reconnect() {
        let connector = ScriptedConnector::default();
        let (mut client, _) = client(&connector, no_jitter());
        client.connect();
        connector.latest().send(TransportEvent::Opened).unwrap();
        client.poll();

        let tx = connector.latest();
        tx.send(TransportEvent::Closing).unwrap();
        tx.send(TransportEvent::Closed { reason: Some("bye".into()) }).unwrap();
        client.poll();
        assert_eq!(client.state(), ConnectionState::Closed);
        assert_eq!(connector.attempts(), 1);
        assert_eq!(client.last_close_reason(), Some("bye"));

        client.poll();
        assert_eq!(connector.attempts(), 2);
        assert_eq!(client.state(), ConnectionState::Connecting);

        client.poll();
        assert_eq!(connector.attempts(), 2);
    }

    #[test]
    fn test_closing_state_observed() {
        let connector = ScriptedConnector::default();
        let (mut client, _) = client(&connector, no_jitter());
        client.connect();
        let tx = connector.latest();
        tx.send(TransportEvent::Opened).unwrap();
        tx.send(TransportEvent::Closing).unwrap();
        client.poll();
        assert_eq!(client.state(), ConnectionState::Closing);
        assert!(!client.is_open());
    }

    #[test]
    fn test_task_disconnect_treated_as_closed() {
        let connector = ScriptedConnector::default();
        let (mut client, _) = client(&connector, no_jitter());
        client.connect();
        connector.latest().send(TransportEvent::Opened).unwrap();
        client.poll();

        connector.senders.lock().clear();
        client.poll();
        assert_eq!(client.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_backoff_after_repeated_failures() {
        let connector = ScriptedConnector::default();
        let (mut client, clock) = client(&connector, no_jitter());
        client.connect();

        // First failure: retry on the next poll.
        connector
            .latest()
            .send(TransportEvent::Closed { reason: None })
            .unwrap();
        client.poll();
        client.poll();
        assert_eq!(connector.attempts(), 2);

        // Second failure: wait the initial delay.
        connector
            .latest()
            .send(TransportEvent::Closed { reason: None })
            .unwrap();
        client.poll();
        client.poll();
        assert_eq!(connector.attempts(), 2);

        clock.advance(Duration::from_millis(249));
        client.poll();
        assert_eq!(connector.attempts(), 2);

        clock.advance(Duration::from_millis(1));
        client.poll();
        assert_eq!(connector.attempts(), 3);

        // Opening resets the backoff.
        connector.latest().send(TransportEvent::Opened).unwrap();
        client.poll();
        connector
            .latest()
            .send(TransportEvent::Closed { reason: None })
            .unwrap();
        client.poll();
        client.poll();
        assert_eq!(connector.attempts(), 4);
    }

    #[test]
    fn test_immediate_policy_retries_every_poll() {
        let connector = ScriptedConnector::default();
        *connector.fail_sync.lock() = true;
        let (mut client, _) = client(&connector, ReconnectPolicy::immediate());
        client.connect();
        assert_eq!(client.state(), ConnectionState::Closed);

        for expected in 2..6 {
            client.poll();
            assert_eq!(connector.attempts(), expected);
        }
    }

    #[test]
    fn test_close_stops_reconnect() {
        let connector = ScriptedConnector::default();
        let (mut client, _) = client(&connector, ReconnectPolicy::immediate());
        client.connect();
        connector.latest().send(TransportEvent::Opened).unwrap();
        client.poll();

        client.close();
        assert_eq!(client.state(), ConnectionState::Closed);
        for _ in 0..3 {
            client.poll();
        }
        assert_eq!(connector.attempts(), 1);

        client.connect();
        assert_eq!(connector.attempts(), 2);
    }
}
