//! Server-side action execution bookkeeping.
//!
//! The AI decides what to do and when; this player tracks which action is
//! active, enforces reuse times, and records the action events viewers must
//! replay. How actions actually move or hurt things is handled elsewhere.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use arena_shared::{
    entity::NetworkObjectId,
    game_data::{ActionId, GameData},
    net::{ActionEvent, ActionRequest},
};
use tracing::{debug, warn};

/// Command surface the AI drives.
pub trait ActionSink {
    /// Starts (or queues) an action.
    fn play_action(&mut self, request: ActionRequest);

    /// Cancels the active action and everything queued behind it.
    fn clear_actions(&mut self);

    /// Currently running action, if any.
    fn active_action(&self) -> Option<&ActionRequest>;

    /// Whether `action` may be started again.
    fn is_reuse_time_elapsed(&self, action: ActionId) -> bool;
}

#[derive(Debug, Clone)]
struct ActiveAction {
    request: ActionRequest,
    elapsed: f32,
    duration: f32,
}

/// Per-character action player.
#[derive(Debug)]
pub struct ServerActionPlayer {
    owner: NetworkObjectId,
    data: Arc<GameData>,
    active: Option<ActiveAction>,
    queue: VecDeque<ActionRequest>,
    last_started: HashMap<ActionId, f32>,
    now: f32,
    outbox: Vec<ActionEvent>,
}

impl ServerActionPlayer {
    pub fn new(owner: NetworkObjectId, data: Arc<GameData>) -> Self {
        Self {
            owner,
            data,
            active: None,
            queue: VecDeque::new(),
            last_started: HashMap::new(),
            now: 0.0,
            outbox: Vec::new(),
        }
    }

    fn start(&mut self, request: ActionRequest) {
        let duration = match self.data.action(request.action_id) {
            Ok(proto) => proto.duration_secs,
            Err(e) => {
                warn!(entity = %self.owner, error = %e, "Ignoring unknown action");
                return;
            }
        };

        debug!(entity = %self.owner, action = %request.action_id, "Action started");
        self.last_started.insert(request.action_id, self.now);
        self.outbox.push(ActionEvent::PlayAction(request.clone()));
        self.active = Some(ActiveAction {
            request,
            elapsed: 0.0,
            duration,
        });
    }

    /// Cancels active or queued actions of one prototype.
    pub fn cancel_by_prototype(&mut self, action: ActionId) {
        if self
            .active
            .as_ref()
            .is_some_and(|a| a.request.action_id == action)
        {
            self.active = None;
        }
        self.queue.retain(|r| r.action_id != action);
        self.outbox.push(ActionEvent::CancelByPrototype(action));
    }

    /// Reports how charged-up the active attack was when charging stopped.
    pub fn stop_charging(&mut self, percent: f32) {
        self.outbox.push(ActionEvent::StopCharging {
            percent: percent.clamp(0.0, 1.0),
        });
    }

    /// Advances timers; finished actions make way for the next queued one.
    pub fn advance(&mut self, dt_sec: f32) {
        self.now += dt_sec;

        let finished = match self.active.as_mut() {
            Some(active) => {
                active.elapsed += dt_sec;
                active.duration > 0.0 && active.elapsed >= active.duration
            }
            None => false,
        };

        if finished || self.active.is_none() {
            self.active = None;
            if let Some(next) = self.queue.pop_front() {
                self.start(next);
            }
        }
    }

    /// Takes the action events produced since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.outbox)
    }
}

impl ActionSink for ServerActionPlayer {
    fn play_action(&mut self, request: ActionRequest) {
        if request.should_queue && self.active.is_some() {
            self.queue.push_back(request);
            return;
        }
        self.start(request);
    }

    fn clear_actions(&mut self) {
        self.active = None;
        self.queue.clear();
        self.outbox.push(ActionEvent::CancelAll);
    }

    fn active_action(&self) -> Option<&ActionRequest> {
        self.active.as_ref().map(|a| &a.request)
    }

    fn is_reuse_time_elapsed(&self, action: ActionId) -> bool {
        let Some(started) = self.last_started.get(&action) else {
            return true;
        };
        let reuse = self
            .data
            .action(action)
            .map(|p| p.reuse_time_secs)
            .unwrap_or(0.0);
        self.now - started >= reuse
    }
}

#[cfg(test)]
mod tests {
    use arena_shared::game_data::{IMP_MELEE, STUNNED, TANK_MELEE, TANK_SHIELD};

    use super::*;

    fn player() -> ServerActionPlayer {
        ServerActionPlayer::new(NetworkObjectId(1), Arc::new(GameData::builtin()))
    }

    #[test]
    fn reuse_time_gates_restart() {
        let mut p = player();
        assert!(p.is_reuse_time_elapsed(IMP_MELEE));
        p.play_action(ActionRequest::new(IMP_MELEE));
        assert!(!p.is_reuse_time_elapsed(IMP_MELEE));
        p.advance(0.5);
        assert!(!p.is_reuse_time_elapsed(IMP_MELEE));
        p.advance(0.4);
        assert!(p.is_reuse_time_elapsed(IMP_MELEE));
    }

    #[test]
    fn active_action_expires_after_duration() {
        let mut p = player();
        p.play_action(ActionRequest::new(IMP_MELEE));
        assert!(p.active_action().is_some());
        p.advance(0.7);
        assert!(p.active_action().is_none());
    }

    #[test]
    fn queued_action_starts_when_active_finishes() {
        let mut p = player();
        p.play_action(ActionRequest::new(IMP_MELEE));
        let mut queued = ActionRequest::new(STUNNED);
        queued.should_queue = true;
        p.play_action(queued);
        assert_eq!(p.active_action().unwrap().action_id, IMP_MELEE);

        p.advance(0.7);
        assert_eq!(p.active_action().unwrap().action_id, STUNNED);
        let events = p.take_events();
        assert_eq!(events.len(), 2);
        assert!(p.take_events().is_empty());
    }

    #[test]
    fn clear_emits_cancel_all() {
        let mut p = player();
        p.play_action(ActionRequest::new(IMP_MELEE));
        p.clear_actions();
        assert!(p.active_action().is_none());
        assert_eq!(p.take_events().last(), Some(&ActionEvent::CancelAll));
    }

    #[test]
    fn cancel_by_prototype_drops_active_and_queued_of_that_kind() {
        let mut p = player();
        p.play_action(ActionRequest::new(TANK_SHIELD));
        let mut queued = ActionRequest::new(TANK_SHIELD);
        queued.should_queue = true;
        p.play_action(queued);
        let mut other = ActionRequest::new(TANK_MELEE);
        other.should_queue = true;
        p.play_action(other);
        p.take_events();

        p.cancel_by_prototype(TANK_SHIELD);
        assert!(p.active_action().is_none());
        assert_eq!(p.take_events(), vec![ActionEvent::CancelByPrototype(TANK_SHIELD)]);

        // Only the other prototype is left in the queue.
        p.advance(0.1);
        assert_eq!(p.active_action().unwrap().action_id, TANK_MELEE);
        p.advance(0.5);
        assert!(p.active_action().is_none());
    }

    #[test]
    fn cancel_by_prototype_keeps_other_active_action() {
        let mut p = player();
        p.play_action(ActionRequest::new(TANK_MELEE));
        p.cancel_by_prototype(TANK_SHIELD);
        assert_eq!(p.active_action().unwrap().action_id, TANK_MELEE);
    }

    #[test]
    fn stop_charging_reports_clamped_percent() {
        let mut p = player();
        p.play_action(ActionRequest::new(TANK_SHIELD));
        p.take_events();

        p.stop_charging(0.4);
        p.stop_charging(1.7);
        assert_eq!(
            p.take_events(),
            vec![
                ActionEvent::StopCharging { percent: 0.4 },
                ActionEvent::StopCharging { percent: 1.0 },
            ]
        );
        assert_eq!(p.active_action().unwrap().action_id, TANK_SHIELD);
    }
}
