//! Fan-out of action events to viewers.
//!
//! Viewers subscribe per target character. Every event for a target gets the
//! next sequence number for that target, so receivers can discard redeliveries.

use std::collections::HashMap;

use arena_shared::{
    entity::NetworkObjectId,
    net::{ActionEvent, ActionEventEnvelope},
};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ActionEventBroadcaster {
    subscribers: HashMap<NetworkObjectId, Vec<mpsc::UnboundedSender<ActionEventEnvelope>>>,
    next_seq: HashMap<NetworkObjectId, u64>,
}

impl ActionEventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new stream of events addressed to `target`.
    pub fn subscribe(
        &mut self,
        target: NetworkObjectId,
    ) -> mpsc::UnboundedReceiver<ActionEventEnvelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.entry(target).or_default().push(tx);
        rx
    }

    /// Sends `event` to every live subscriber of `target` and returns its sequence
    /// number. Closed subscribers are dropped.
    pub fn publish(&mut self, target: NetworkObjectId, event: ActionEvent) -> u64 {
        let seq = self.next_seq.entry(target).or_insert(0);
        *seq += 1;
        let envelope = ActionEventEnvelope {
            target,
            seq: *seq,
            event,
        };

        if let Some(subs) = self.subscribers.get_mut(&target) {
            subs.retain(|tx| tx.send(envelope.clone()).is_ok());
        }
        debug!(target = %target, seq = envelope.seq, "Action event published");
        envelope.seq
    }

    /// Drops every subscription for `target`; their receivers see end-of-stream.
    pub fn close(&mut self, target: NetworkObjectId) {
        self.subscribers.remove(&target);
        self.next_seq.remove(&target);
    }

    pub fn subscriber_count(&self, target: NetworkObjectId) -> usize {
        self.subscribers.get(&target).map_or(0, Vec::len)
    }
}
