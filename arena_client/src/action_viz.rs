//! Action visualization.
//!
//! The reconciliation engine decides when each action event fires; what an
//! action looks like belongs to an [`ActionVisualizer`]. [`ClientActionPlayer`]
//! is the stock implementation: it keeps the list of effects currently playing.

use std::sync::Arc;

use arena_shared::{
    game_data::{ActionId, ActionLogic, GameData},
    net::ActionRequest,
};
use tracing::debug;

/// Events raised by animation clips at authored points in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A melee swing connects.
    Hit,
    /// A projectile leaves the hand.
    Release,
    Footstep,
}

/// Receives every visual trigger for one character.
pub trait ActionVisualizer {
    /// Authoritative start of an action.
    fn play_action(&mut self, request: &ActionRequest);

    /// Local, speculative start of an action before the server confirms it.
    fn anticipate_action(&mut self, request: &ActionRequest);

    fn cancel_all_actions(&mut self);

    fn cancel_actions_by_prototype(&mut self, action: ActionId);

    /// `percent` is in $[0,1]$.
    fn on_stopped_charging_up(&mut self, percent: f32);

    fn on_anim_event(&mut self, event: AnimationEvent);

    fn on_update(&mut self, dt: f32);
}

/// One effect on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayingFx {
    pub request: ActionRequest,
    /// Started locally and not yet confirmed by the server.
    pub anticipated: bool,
    pub elapsed: f32,
    pub charge: Option<f32>,
    pub anim_events: Vec<AnimationEvent>,
}

impl PlayingFx {
    fn new(request: ActionRequest, anticipated: bool) -> Self {
        Self {
            request,
            anticipated,
            elapsed: 0.0,
            charge: None,
            anim_events: Vec::new(),
        }
    }
}

/// Stock visualizer.
///
/// A confirmed `PlayAction` for an action that is being anticipated replaces the
/// anticipated effect instead of starting a second one.
#[derive(Debug)]
pub struct ClientActionPlayer {
    data: Arc<GameData>,
    playing: Vec<PlayingFx>,
}

impl ClientActionPlayer {
    pub fn new(data: Arc<GameData>) -> Self {
        Self {
            data,
            playing: Vec::new(),
        }
    }

    pub fn playing(&self) -> &[PlayingFx] {
        &self.playing
    }

    pub fn is_playing(&self, action: ActionId) -> bool {
        self.playing.iter().any(|fx| fx.request.action_id == action)
    }
}

impl ActionVisualizer for ClientActionPlayer {
    fn play_action(&mut self, request: &ActionRequest) {
        if let Some(fx) = self
            .playing
            .iter_mut()
            .find(|fx| fx.anticipated && fx.request.action_id == request.action_id)
        {
            debug!(action = %request.action_id, "Anticipated action confirmed");
            fx.request = request.clone();
            fx.anticipated = false;
            return;
        }
        self.playing.push(PlayingFx::new(request.clone(), false));
    }

    fn anticipate_action(&mut self, request: &ActionRequest) {
        if self
            .playing
            .iter()
            .any(|fx| fx.anticipated && fx.request.action_id == request.action_id)
        {
            return;
        }
        self.playing.push(PlayingFx::new(request.clone(), true));
    }

    fn cancel_all_actions(&mut self) {
        self.playing.clear();
    }

    fn cancel_actions_by_prototype(&mut self, action: ActionId) {
        self.playing.retain(|fx| fx.request.action_id != action);
    }

    fn on_stopped_charging_up(&mut self, percent: f32) {
        let data = &self.data;
        for fx in self.playing.iter_mut() {
            let charged = data
                .action(fx.request.action_id)
                .is_ok_and(|p| p.logic == ActionLogic::ChargedShield);
            if charged {
                fx.charge = Some(percent.clamp(0.0, 1.0));
            }
        }
    }

    fn on_anim_event(&mut self, event: AnimationEvent) {
        if let Some(fx) = self.playing.last_mut() {
            fx.anim_events.push(event);
        }
    }

    fn on_update(&mut self, dt: f32) {
        let data = &self.data;
        self.playing.retain_mut(|fx| {
            fx.elapsed += dt;
            let duration = data
                .action(fx.request.action_id)
                .map(|p| p.duration_secs)
                .unwrap_or(0.0);
            duration <= 0.0 || fx.elapsed < duration
        });
    }
}

#[cfg(test)]
mod tests {
    use arena_shared::game_data::{IMP_MELEE, TANK_MELEE, TANK_SHIELD};

    use super::*;

    fn player() -> ClientActionPlayer {
        ClientActionPlayer::new(Arc::new(GameData::builtin()))
    }

    #[test]
    fn confirmed_play_replaces_anticipated() {
        let mut p = player();
        p.anticipate_action(&ActionRequest::new(TANK_MELEE));
        p.anticipate_action(&ActionRequest::new(TANK_MELEE));
        assert_eq!(p.playing().len(), 1);
        assert!(p.playing()[0].anticipated);

        p.play_action(&ActionRequest::new(TANK_MELEE));
        assert_eq!(p.playing().len(), 1);
        assert!(!p.playing()[0].anticipated);
    }

    #[test]
    fn cancel_by_prototype_leaves_others() {
        let mut p = player();
        p.play_action(&ActionRequest::new(TANK_MELEE));
        p.play_action(&ActionRequest::new(TANK_SHIELD));
        p.cancel_actions_by_prototype(TANK_MELEE);
        assert!(!p.is_playing(TANK_MELEE));
        assert!(p.is_playing(TANK_SHIELD));
    }

    #[test]
    fn stop_charging_marks_charged_actions_only() {
        let mut p = player();
        p.play_action(&ActionRequest::new(TANK_SHIELD));
        p.play_action(&ActionRequest::new(TANK_MELEE));
        p.on_stopped_charging_up(0.75);
        assert_eq!(p.playing()[0].charge, Some(0.75));
        assert_eq!(p.playing()[1].charge, None);
    }

    #[test]
    fn effects_expire_after_their_duration() {
        let mut p = player();
        p.play_action(&ActionRequest::new(IMP_MELEE));
        p.on_update(0.3);
        assert!(p.is_playing(IMP_MELEE));
        p.on_update(0.4);
        assert!(!p.is_playing(IMP_MELEE));
    }
}
