//! Action wire types.
//!
//! The authoritative side produces these; viewers consume them. Transport is not
//! part of this crate: anything that preserves per-target order and carries the
//! `seq` field through unchanged is enough.

use serde::{Deserialize, Serialize};

use crate::{entity::NetworkObjectId, game_data::ActionId, math::Vec3};

/// A request to run an action, either issued by AI/input or replayed on viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action_id: ActionId,
    #[serde(default)]
    pub targets: Vec<NetworkObjectId>,
    #[serde(default)]
    pub direction: Vec3,
    /// Move into range of the first target before executing.
    #[serde(default)]
    pub should_close: bool,
    /// Queue behind the active action instead of replacing it.
    #[serde(default)]
    pub should_queue: bool,
}

impl ActionRequest {
    pub fn new(action_id: ActionId) -> Self {
        Self {
            action_id,
            targets: Vec::new(),
            direction: Vec3::ZERO,
            should_close: false,
            should_queue: false,
        }
    }

    pub fn with_target(mut self, target: NetworkObjectId) -> Self {
        self.targets.push(target);
        self
    }

    pub fn primary_target(&self) -> Option<NetworkObjectId> {
        self.targets.first().copied()
    }
}

/// Discrete, out-of-band action notification for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionEvent {
    PlayAction(ActionRequest),
    CancelAll,
    CancelByPrototype(ActionId),
    /// `percent` is in $[0,1]$: how charged-up the attack ended up.
    StopCharging { percent: f32 },
}

/// An action event addressed to a character, numbered per target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEventEnvelope {
    pub target: NetworkObjectId,
    /// Strictly increasing per target; lets receivers drop redeliveries.
    pub seq: u64,
    pub event: ActionEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_json_keeps_order_fields() {
        let env = ActionEventEnvelope {
            target: NetworkObjectId(4),
            seq: 12,
            event: ActionEvent::PlayAction(
                ActionRequest::new(ActionId(10)).with_target(NetworkObjectId(9)),
            ),
        };
        let text = serde_json::to_string(&env).unwrap();
        let back: ActionEventEnvelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, env);
        assert_eq!(back.seq, 12);
    }
}
