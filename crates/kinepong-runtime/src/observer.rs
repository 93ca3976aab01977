//! Pose observers
//!
//! Subscribers are called synchronously in registration order, once per
//! frame that carried at least one player.

use std::fmt;

use tokio::sync::mpsc;

use kinepong_core::PlayerRecord;

/// Players extracted from one frame
#[derive(Clone, Debug, PartialEq)]
pub struct PoseEvent {
    /// Decoded frame sequence number (starts at 1)
    pub sequence: u64,
    pub players: Vec<PlayerRecord>,
}

impl PoseEvent {
    pub fn primary(&self) -> Option<&PlayerRecord> {
        self.players.first()
    }
}

/// Subscription handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&PoseEvent) + Send>;

/// Ordered observer list
#[derive(Default)]
pub struct PoseObservers {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl PoseObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&PoseEvent) + Send + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Forward events into an unbounded channel for async consumers.
    /// Events are dropped silently once the receiver is gone.
    pub fn channel(&mut self) -> (SubscriptionId, mpsc::UnboundedReceiver<PoseEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribe(move |event: &PoseEvent| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    pub fn notify(&mut self, event: &PoseEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for PoseObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseObservers")
            .field("subscribers", &self.observers.len())
            .finish()
    }
}
