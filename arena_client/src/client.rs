//! Client reconciliation engine.
//!
//! One [`ClientCharacter`] per visualized character. Each render frame it:
//! - pulls action events delivered since the last frame,
//! - reads the authoritative body pose through the physics registry and smooths
//!   it into the local visual pose,
//! - pushes the animation speed to the animator,
//! - applies queued action/animation events in arrival order, exactly once each.
//!
//! Pose is pulled; discrete events are pushed through a FIFO. Events only ever
//! act on what is currently playing, never on events still waiting in the queue.

use anyhow::Context;
use arena_shared::{
    character::{LifeState, MovementStatus},
    entity::NetworkObjectId,
    event::{EventQueue, SeqFilter},
    game_data::ActionId,
    math::{Quat, Vec3},
    net::{ActionEvent, ActionEventEnvelope, ActionRequest},
    physics::PhysicsRegistry,
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info};

use crate::{
    action_viz::{ActionVisualizer, AnimationEvent},
    input::InputEvent,
    lerp::{PositionLerper, RotationLerper},
    visual::{AnimatorTrigger, CharacterAnimator, SpecialMaterialMode, VisualizationConfig},
};

/// How this peer relates to the character it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerRole {
    /// This peer also runs the authoritative simulation.
    pub is_host: bool,
    /// This peer controls the character.
    pub is_owner: bool,
}

impl ViewerRole {
    pub const HOST_OWNER: Self = Self {
        is_host: true,
        is_owner: true,
    };
    pub const HOST_OBSERVER: Self = Self {
        is_host: true,
        is_owner: false,
    };
    pub const REMOTE_OWNER: Self = Self {
        is_host: false,
        is_owner: true,
    };
    pub const REMOTE_OBSERVER: Self = Self {
        is_host: false,
        is_owner: false,
    };

    /// Anticipated actions only run on owning peers that are not the host.
    pub fn anticipates_actions(self) -> bool {
        self.is_owner && !self.is_host
    }
}

/// Replicated character fields a viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplicatedState {
    pub is_npc: bool,
    pub movement_status: MovementStatus,
    pub life_state: LifeState,
    pub is_stealthy: bool,
}

/// Static settings for a reconciliation engine.
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    pub lerp_time_secs: f32,
    pub visualization: VisualizationConfig,
    /// Played locally by owners right after attaching.
    pub general_target_action: Option<ActionId>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            lerp_time_secs: 0.08,
            visualization: VisualizationConfig::default(),
            general_target_action: None,
        }
    }
}

/// Local visual pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Clone, PartialEq)]
enum QueuedEvent {
    Action(ActionEvent),
    Animation(AnimationEvent),
}

/// Per-character reconciliation engine.
pub struct ClientCharacter<V, A> {
    entity: NetworkObjectId,
    registry: PhysicsRegistry,
    role: ViewerRole,
    settings: ReconcileSettings,
    attached: bool,

    position_lerper: PositionLerper,
    rotation_lerper: RotationLerper,
    lerped_position: Vec3,
    lerped_rotation: Quat,

    state: ReplicatedState,
    current_speed: f32,
    appearance: SpecialMaterialMode,

    events: EventQueue<QueuedEvent>,
    inbox: Option<mpsc::UnboundedReceiver<ActionEventEnvelope>>,
    seen: SeqFilter,

    visualizer: V,
    animator: A,
}

impl<V: ActionVisualizer, A: CharacterAnimator> ClientCharacter<V, A> {
    /// Attaches to an authoritative character whose body is in `registry`.
    ///
    /// The local pose snaps to the current authoritative pose; interpolation
    /// starts from there.
    pub fn attach(
        entity: NetworkObjectId,
        registry: PhysicsRegistry,
        role: ViewerRole,
        state: ReplicatedState,
        settings: ReconcileSettings,
        mut visualizer: V,
        mut animator: A,
    ) -> anyhow::Result<Self> {
        let body = registry
            .try_get(entity)
            .with_context(|| format!("attach viewer: no physics body registered for {entity}"))?;
        let transform = body.transform();

        let current_speed = settings
            .visualization
            .animation_speed(state.movement_status, state.life_state);
        animator.set_speed(current_speed);

        if !state.is_npc && role.is_owner {
            if let Some(action) = settings.general_target_action {
                visualizer.play_action(&ActionRequest::new(action));
            }
        }

        info!(entity = %entity, ?role, "Viewer attached");

        Ok(Self {
            entity,
            registry,
            role,
            attached: true,
            position_lerper: PositionLerper::new(transform.position, settings.lerp_time_secs),
            rotation_lerper: RotationLerper::new(transform.rotation, settings.lerp_time_secs),
            lerped_position: transform.position,
            lerped_rotation: transform.rotation,
            state,
            current_speed,
            appearance: SpecialMaterialMode::for_viewer(state.is_stealthy, role.is_owner),
            events: EventQueue::new(),
            inbox: None,
            seen: SeqFilter::new(),
            settings,
            visualizer,
            animator,
        })
    }

    /// Drops the event subscription and stops reacting to frames.
    pub fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.inbox = None;
            info!(entity = %self.entity, "Viewer detached");
        }
    }

    pub fn entity(&self) -> NetworkObjectId {
        self.entity
    }

    pub fn role(&self) -> ViewerRole {
        self.role
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.lerped_position,
            rotation: self.lerped_rotation,
        }
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn appearance(&self) -> SpecialMaterialMode {
        self.appearance
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    /// Number of events waiting for the next frame.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Sets the stream action events arrive on.
    pub fn connect(&mut self, rx: mpsc::UnboundedReceiver<ActionEventEnvelope>) {
        self.inbox = Some(rx);
    }

    /// Queues an action event. Returns false if it is addressed elsewhere or its
    /// `seq` was already seen. Events that arrive ahead of an earlier one are
    /// still queued, and the earlier one is accepted when it shows up.
    pub fn enqueue(&mut self, envelope: ActionEventEnvelope) -> bool {
        if envelope.target != self.entity {
            debug!(
                entity = %self.entity,
                target = %envelope.target,
                "Dropping event for another character"
            );
            return false;
        }
        if !self.seen.insert(envelope.seq) {
            debug!(entity = %self.entity, seq = envelope.seq, "Dropping duplicate action event");
            return false;
        }
        self.events.push(QueuedEvent::Action(envelope.event));
        true
    }

    /// Queues an animation clip event. Goes through the same FIFO as action events.
    pub fn on_anim_event(&mut self, event: AnimationEvent) {
        self.events.push(QueuedEvent::Animation(event));
    }

    pub fn on_movement_status_changed(&mut self, status: MovementStatus) {
        self.state.movement_status = status;
        self.refresh_speed();
    }

    pub fn on_life_state_changed(&mut self, life_state: LifeState) {
        self.state.life_state = life_state;
        self.refresh_speed();
    }

    pub fn on_stealthy_changed(&mut self, is_stealthy: bool) {
        self.state.is_stealthy = is_stealthy;
        self.appearance = SpecialMaterialMode::for_viewer(is_stealthy, self.role.is_owner);
    }

    /// Applies whichever replicated fields differ from what we have.
    pub fn apply_replicated(&mut self, state: ReplicatedState) {
        if state.movement_status != self.state.movement_status {
            self.on_movement_status_changed(state.movement_status);
        }
        if state.life_state != self.state.life_state {
            self.on_life_state_changed(state.life_state);
        }
        if state.is_stealthy != self.state.is_stealthy {
            self.on_stealthy_changed(state.is_stealthy);
        }
    }

    fn refresh_speed(&mut self) {
        self.current_speed = self
            .settings
            .visualization
            .animation_speed(self.state.movement_status, self.state.life_state);
    }

    /// Reacts to local controller input.
    pub fn handle_input(&mut self, input: InputEvent) {
        if !self.attached || !self.role.is_owner {
            return;
        }
        match input {
            InputEvent::Action(request) => {
                if self.role.anticipates_actions() {
                    self.visualizer.anticipate_action(&request);
                }
            }
            InputEvent::Move(_) => {
                if !self.animator.is_animating() {
                    self.animator.set_trigger(AnimatorTrigger::AnticipateMove);
                }
            }
        }
    }

    /// Runs one render frame. Returns the new local pose, or `None` if the body
    /// could not be found this frame (pose is left as it was).
    pub fn frame(&mut self, dt: f32) -> Option<Pose> {
        if !self.attached {
            return None;
        }

        self.pull_events();
        let pose = self.smooth_pose(dt);
        self.animator.set_speed(self.current_speed);
        self.apply_events();
        self.visualizer.on_update(dt);
        pose
    }

    fn pull_events(&mut self) {
        // Collect first to avoid borrowing the receiver while enqueuing.
        let mut received = Vec::new();
        let mut closed = false;
        if let Some(rx) = self.inbox.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(envelope) => received.push(envelope),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }
        }
        if closed {
            debug!(entity = %self.entity, "Action event stream closed");
            self.inbox = None;
        }
        for envelope in received {
            self.enqueue(envelope);
        }
    }

    fn smooth_pose(&mut self, dt: f32) -> Option<Pose> {
        let Some(body) = self.registry.try_get(self.entity) else {
            debug!(entity = %self.entity, "No body this frame; skipping pose smoothing");
            return None;
        };
        let target = body.transform();

        self.lerped_position =
            self.position_lerper
                .advance(self.lerped_position, target.position, dt);
        self.lerped_rotation =
            self.rotation_lerper
                .advance(self.lerped_rotation, target.rotation, dt);
        Some(self.pose())
    }

    fn apply_events(&mut self) {
        for event in self.events.drain() {
            match event {
                QueuedEvent::Action(ActionEvent::PlayAction(request)) => {
                    self.visualizer.play_action(&request);
                }
                QueuedEvent::Action(ActionEvent::CancelAll) => {
                    self.visualizer.cancel_all_actions();
                }
                QueuedEvent::Action(ActionEvent::CancelByPrototype(action)) => {
                    self.visualizer.cancel_actions_by_prototype(action);
                }
                QueuedEvent::Action(ActionEvent::StopCharging { percent }) => {
                    self.visualizer.on_stopped_charging_up(percent);
                }
                QueuedEvent::Animation(event) => {
                    self.visualizer.on_anim_event(event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
