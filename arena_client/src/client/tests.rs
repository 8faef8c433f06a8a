use std::sync::Arc;

use arena_shared::{
    game_data::{GameData, GENERAL_TARGET, IMP_MELEE, TANK_MELEE, TANK_SHIELD},
    physics::{Collider, PhysicsBody, Transform},
};
use rstest::rstest;

use super::*;
use crate::{action_viz::ClientActionPlayer, visual::HeadlessAnimator};

/// Records every visualizer call in order.
#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<String>,
}

impl ActionVisualizer for Recorder {
    fn play_action(&mut self, request: &ActionRequest) {
        self.calls.push(format!("play {}", request.action_id));
    }
    fn anticipate_action(&mut self, request: &ActionRequest) {
        self.calls.push(format!("anticipate {}", request.action_id));
    }
    fn cancel_all_actions(&mut self) {
        self.calls.push("cancel_all".into());
    }
    fn cancel_actions_by_prototype(&mut self, action: ActionId) {
        self.calls.push(format!("cancel {action}"));
    }
    fn on_stopped_charging_up(&mut self, percent: f32) {
        self.calls.push(format!("stop_charging {percent}"));
    }
    fn on_anim_event(&mut self, event: AnimationEvent) {
        self.calls.push(format!("anim {event:?}"));
    }
    fn on_update(&mut self, _dt: f32) {}
}

const ID: NetworkObjectId = NetworkObjectId(7);

fn registry_with_body(at: Vec3) -> PhysicsRegistry {
    let registry = PhysicsRegistry::new();
    registry
        .register(ID, PhysicsBody::new(Transform::from_position(at), Collider::default()))
        .unwrap();
    registry
}

fn settings() -> ReconcileSettings {
    ReconcileSettings {
        lerp_time_secs: 0.08,
        general_target_action: Some(GENERAL_TARGET),
        ..Default::default()
    }
}

fn npc_state() -> ReplicatedState {
    ReplicatedState {
        is_npc: true,
        movement_status: MovementStatus::Normal,
        ..Default::default()
    }
}

fn attach(
    role: ViewerRole,
    state: ReplicatedState,
) -> (PhysicsRegistry, ClientCharacter<Recorder, HeadlessAnimator>) {
    let registry = registry_with_body(Vec3::ZERO);
    let viewer = ClientCharacter::attach(
        ID,
        registry.clone(),
        role,
        state,
        settings(),
        Recorder::default(),
        HeadlessAnimator::default(),
    )
    .unwrap();
    (registry, viewer)
}

fn envelope(seq: u64, event: ActionEvent) -> ActionEventEnvelope {
    ActionEventEnvelope {
        target: ID,
        seq,
        event,
    }
}

#[test]
fn attach_without_body_fails() {
    let result = ClientCharacter::attach(
        ID,
        PhysicsRegistry::new(),
        ViewerRole::HOST_OBSERVER,
        npc_state(),
        settings(),
        Recorder::default(),
        HeadlessAnimator::default(),
    );
    let err = result.err().unwrap();
    assert!(err.to_string().contains("no physics body"));
}

#[test]
fn attach_snaps_to_authoritative_pose() {
    let registry = registry_with_body(Vec3::new(3.0, 0.0, 4.0));
    let viewer = ClientCharacter::attach(
        ID,
        registry,
        ViewerRole::REMOTE_OBSERVER,
        npc_state(),
        settings(),
        Recorder::default(),
        HeadlessAnimator::default(),
    )
    .unwrap();
    assert_eq!(viewer.pose().position, Vec3::new(3.0, 0.0, 4.0));
    assert_eq!(viewer.animator().speed, 1.0);
}

#[test]
fn owner_plays_general_target_on_attach() {
    let state = ReplicatedState {
        is_npc: false,
        ..Default::default()
    };
    let (_, owner) = attach(ViewerRole::REMOTE_OWNER, state);
    assert_eq!(owner.visualizer().calls, vec![format!("play {GENERAL_TARGET}")]);

    let (_, observer) = attach(ViewerRole::REMOTE_OBSERVER, state);
    assert!(observer.visualizer().calls.is_empty());

    let (_, npc) = attach(ViewerRole::HOST_OWNER, npc_state());
    assert!(npc.visualizer().calls.is_empty());
}

#[test]
fn events_apply_once_in_arrival_order() {
    let (_, mut viewer) = attach(ViewerRole::HOST_OBSERVER, npc_state());
    assert!(viewer.enqueue(envelope(1, ActionEvent::PlayAction(ActionRequest::new(IMP_MELEE)))));
    viewer.on_anim_event(AnimationEvent::Hit);
    assert!(viewer.enqueue(envelope(2, ActionEvent::CancelByPrototype(IMP_MELEE))));
    assert!(viewer.enqueue(envelope(3, ActionEvent::StopCharging { percent: 0.5 })));
    assert_eq!(viewer.pending_events(), 4);

    viewer.frame(0.016);
    assert_eq!(
        viewer.visualizer().calls,
        vec![
            format!("play {IMP_MELEE}"),
            "anim Hit".to_string(),
            format!("cancel {IMP_MELEE}"),
            "stop_charging 0.5".to_string(),
        ]
    );
    assert_eq!(viewer.pending_events(), 0);

    viewer.frame(0.016);
    assert_eq!(viewer.visualizer().calls.len(), 4);
}

#[test]
fn redelivered_and_misaddressed_events_are_dropped() {
    let (_, mut viewer) = attach(ViewerRole::HOST_OBSERVER, npc_state());
    assert!(viewer.enqueue(envelope(1, ActionEvent::CancelAll)));
    assert!(!viewer.enqueue(envelope(1, ActionEvent::CancelAll)));
    assert!(!viewer.enqueue(ActionEventEnvelope {
        target: NetworkObjectId(99),
        seq: 2,
        event: ActionEvent::CancelAll,
    }));
    assert_eq!(viewer.pending_events(), 1);
}

#[test]
fn late_arrival_of_earlier_seq_is_still_applied() {
    let (_, mut viewer) = attach(ViewerRole::HOST_OBSERVER, npc_state());
    assert!(viewer.enqueue(envelope(2, ActionEvent::CancelAll)));
    assert!(viewer.enqueue(envelope(1, ActionEvent::PlayAction(ActionRequest::new(IMP_MELEE)))));
    assert!(!viewer.enqueue(envelope(2, ActionEvent::CancelAll)));
    assert!(!viewer.enqueue(envelope(1, ActionEvent::PlayAction(ActionRequest::new(IMP_MELEE)))));
    assert_eq!(viewer.pending_events(), 2);

    viewer.frame(0.016);
    assert_eq!(
        viewer.visualizer().calls,
        vec!["cancel_all".to_string(), format!("play {IMP_MELEE}")]
    );
}

#[test]
fn connected_stream_feeds_the_queue() {
    let (_, mut viewer) = attach(ViewerRole::REMOTE_OBSERVER, npc_state());
    let (tx, rx) = mpsc::unbounded_channel();
    viewer.connect(rx);
    tx.send(envelope(1, ActionEvent::PlayAction(ActionRequest::new(IMP_MELEE)))).unwrap();
    tx.send(envelope(2, ActionEvent::CancelAll)).unwrap();
    drop(tx);

    viewer.frame(0.016);
    assert_eq!(
        viewer.visualizer().calls,
        vec![format!("play {IMP_MELEE}"), "cancel_all".to_string()]
    );
}

#[test]
fn cancel_all_only_hits_what_is_playing() {
    let registry = registry_with_body(Vec3::ZERO);
    let data = Arc::new(GameData::builtin());
    let mut viewer = ClientCharacter::attach(
        ID,
        registry,
        ViewerRole::HOST_OBSERVER,
        npc_state(),
        settings(),
        ClientActionPlayer::new(data),
        HeadlessAnimator::default(),
    )
    .unwrap();

    viewer.enqueue(envelope(1, ActionEvent::PlayAction(ActionRequest::new(TANK_MELEE))));
    viewer.enqueue(envelope(2, ActionEvent::PlayAction(ActionRequest::new(TANK_SHIELD))));
    viewer.enqueue(envelope(3, ActionEvent::CancelAll));
    viewer.enqueue(envelope(4, ActionEvent::PlayAction(ActionRequest::new(TANK_MELEE))));
    viewer.frame(0.0);

    assert_eq!(viewer.visualizer().playing().len(), 1);
    assert!(viewer.visualizer().is_playing(TANK_MELEE));
}

#[test]
fn pose_follows_body_smoothly() {
    let (registry, mut viewer) = attach(ViewerRole::HOST_OBSERVER, npc_state());
    registry
        .try_get(ID)
        .unwrap()
        .set_position(Vec3::new(10.0, 0.0, 0.0));

    let first = viewer.frame(0.02).unwrap();
    assert!(first.position.x > 0.0 && first.position.x < 10.0);

    for _ in 0..5 {
        viewer.frame(0.02);
    }
    assert_eq!(viewer.pose().position, Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn missing_body_keeps_last_pose() {
    let (registry, mut viewer) = attach(ViewerRole::HOST_OBSERVER, npc_state());
    viewer.enqueue(envelope(1, ActionEvent::CancelAll));
    registry.unregister(ID);

    assert_eq!(viewer.frame(0.016), None);
    assert_eq!(viewer.pose().position, Vec3::ZERO);
    // Events still flow even without a body.
    assert_eq!(viewer.visualizer().calls, vec!["cancel_all".to_string()]);
}

#[rstest]
#[case(LifeState::Alive, MovementStatus::Hasted, 1.5)]
#[case(LifeState::Fainted, MovementStatus::Hasted, 0.0)]
#[case(LifeState::Dead, MovementStatus::Normal, 0.0)]
fn replicated_state_drives_speed(
    #[case] life_state: LifeState,
    #[case] movement_status: MovementStatus,
    #[case] expected: f32,
) {
    let (_, mut viewer) = attach(ViewerRole::REMOTE_OBSERVER, npc_state());
    viewer.apply_replicated(ReplicatedState {
        life_state,
        movement_status,
        ..npc_state()
    });
    assert_eq!(viewer.current_speed(), expected);
    viewer.frame(0.016);
    assert_eq!(viewer.animator().speed, expected);
}

#[test]
fn stealth_appearance_depends_on_viewer() {
    let (_, mut owner) = attach(ViewerRole::REMOTE_OWNER, npc_state());
    let (_, mut other) = attach(ViewerRole::REMOTE_OBSERVER, npc_state());
    owner.on_stealthy_changed(true);
    other.on_stealthy_changed(true);
    assert_eq!(owner.appearance(), SpecialMaterialMode::StealthySelf);
    assert_eq!(other.appearance(), SpecialMaterialMode::StealthyOther);

    other.on_stealthy_changed(false);
    assert_eq!(other.appearance(), SpecialMaterialMode::None);
}

#[test]
fn only_remote_owners_anticipate_actions() {
    let request = ActionRequest::new(TANK_MELEE);

    let (_, mut remote) = attach(ViewerRole::REMOTE_OWNER, npc_state());
    remote.handle_input(InputEvent::Action(request.clone()));
    assert_eq!(remote.visualizer().calls, vec![format!("anticipate {TANK_MELEE}")]);

    let (_, mut host) = attach(ViewerRole::HOST_OWNER, npc_state());
    host.handle_input(InputEvent::Action(request.clone()));
    assert!(host.visualizer().calls.is_empty());

    let (_, mut observer) = attach(ViewerRole::REMOTE_OBSERVER, npc_state());
    observer.handle_input(InputEvent::Action(request));
    assert!(observer.visualizer().calls.is_empty());
}

#[test]
fn move_anticipation_only_when_animator_at_rest() {
    let idle = ReplicatedState {
        movement_status: MovementStatus::Idle,
        ..npc_state()
    };
    let (_, mut viewer) = attach(ViewerRole::HOST_OWNER, idle);
    viewer.handle_input(InputEvent::Move(Vec3::new(1.0, 0.0, 0.0)));
    assert_eq!(viewer.animator().triggers, vec![AnimatorTrigger::AnticipateMove]);

    viewer.animator_mut().in_base_state = false;
    viewer.handle_input(InputEvent::Move(Vec3::new(2.0, 0.0, 0.0)));
    assert_eq!(viewer.animator().triggers.len(), 1);
}

#[test]
fn detached_viewer_ignores_frames() {
    let (_, mut viewer) = attach(ViewerRole::HOST_OBSERVER, npc_state());
    viewer.enqueue(envelope(1, ActionEvent::CancelAll));
    viewer.detach();
    assert!(!viewer.is_attached());
    assert_eq!(viewer.frame(0.016), None);
    assert!(viewer.visualizer().calls.is_empty());
}
