//! Authoritative simulation.
//!
//! Owns the roster, one AI brain per NPC, one action player per character, and
//! the event broadcaster. Lifecycle hooks (spawn/despawn/destroy) are the only
//! places that touch the physics registry.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use arena_shared::{
    character::{CharacterType, LifeState, MovementStatus},
    config::SimConfig,
    entity::{ClientId, NetworkObjectId},
    game_data::{ActionId, GameData},
    math::{Quat, Vec3},
    net::{ActionEventEnvelope, ActionRequest},
    physics::{Collider, PhysicsBody, PhysicsRegistry, Transform},
};
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, info};

use crate::{
    action_player::{ActionSink, ServerActionPlayer},
    ai::{AiBrain, AiStateType, StateChange},
    broadcast::ActionEventBroadcaster,
    character::{Roster, ServerCharacter},
};

/// Where and what to spawn.
#[derive(Debug, Clone)]
pub struct SpawnParams {
    pub character_type: CharacterType,
    pub owner: ClientId,
    pub position: Vec3,
    pub rotation: Quat,
}

impl SpawnParams {
    pub fn new(character_type: CharacterType, position: Vec3) -> Self {
        Self {
            character_type,
            owner: ClientId::HOST,
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn owned_by(mut self, owner: ClientId) -> Self {
        self.owner = owner;
        self
    }
}

/// Server simulation.
pub struct Simulation {
    pub cfg: SimConfig,
    data: Arc<GameData>,
    registry: PhysicsRegistry,
    roster: Roster,
    brains: BTreeMap<NetworkObjectId, AiBrain>,
    action_players: HashMap<NetworkObjectId, ServerActionPlayer>,
    broadcaster: ActionEventBroadcaster,
    tick: u64,
}

impl Simulation {
    /// Creates a simulation that registers bodies in `registry`.
    pub fn new(cfg: SimConfig, data: Arc<GameData>, registry: PhysicsRegistry) -> Self {
        Self {
            cfg,
            data,
            registry,
            roster: Roster::default(),
            brains: BTreeMap::new(),
            action_players: HashMap::new(),
            broadcaster: ActionEventBroadcaster::new(),
            tick: 0,
        }
    }

    pub fn registry(&self) -> &PhysicsRegistry {
        &self.registry
    }

    pub fn data(&self) -> &Arc<GameData> {
        &self.data
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn character(&self, id: NetworkObjectId) -> Option<&ServerCharacter> {
        self.roster.get(id)
    }

    pub fn brain(&self, id: NetworkObjectId) -> Option<&AiBrain> {
        self.brains.get(&id)
    }

    pub fn brain_mut(&mut self, id: NetworkObjectId) -> Option<&mut AiBrain> {
        self.brains.get_mut(&id)
    }

    pub fn ai_state(&self, id: NetworkObjectId) -> Option<AiStateType> {
        self.brains.get(&id).map(AiBrain::current_state)
    }

    /// Hated enemies of an NPC, after eviction. Empty for characters without a brain.
    pub fn hated_enemies(&mut self, id: NetworkObjectId) -> Vec<NetworkObjectId> {
        match self.brains.get_mut(&id) {
            Some(brain) => brain.hated_enemies(&self.roster).to_vec(),
            None => Vec::new(),
        }
    }

    pub fn active_action(&self, id: NetworkObjectId) -> Option<&ActionRequest> {
        self.action_players.get(&id).and_then(|p| p.active_action())
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Spawns a character and runs its spawn hook.
    pub fn spawn_character(&mut self, params: SpawnParams) -> anyhow::Result<NetworkObjectId> {
        let class = self
            .data
            .character_class(params.character_type)
            .context("spawn character")?;

        let id = NetworkObjectId::new_unique();
        let body = PhysicsBody::new(
            Transform {
                position: params.position,
                rotation: params.rotation,
                ..Default::default()
            },
            Collider::default(),
        );
        let character = ServerCharacter::new(
            id,
            params.character_type,
            params.owner,
            class.is_npc,
            class.base_hp,
            body.clone(),
        );

        self.registry
            .register(id, body)
            .context("register spawned body")?;

        if class.is_npc {
            self.brains.insert(
                id,
                AiBrain::new(&character, self.data.clone(), self.cfg.ai_seed),
            );
        }
        self.action_players
            .insert(id, ServerActionPlayer::new(id, self.data.clone()));
        self.roster.insert(character);

        info!(entity = %id, character_type = %params.character_type, "Character spawned");
        Ok(id)
    }

    /// Despawn hook. Safe to call more than once.
    pub fn despawn(&mut self, id: NetworkObjectId) -> bool {
        self.registry.unregister(id);
        self.brains.remove(&id);
        self.action_players.remove(&id);
        self.broadcaster.close(id);
        let removed = self.roster.remove(id).is_some();
        if removed {
            info!(entity = %id, "Character despawned");
        }
        removed
    }

    /// Destroy hook. Follows a despawn on the normal path, so it tolerates the
    /// entity being gone already.
    pub fn destroy(&mut self, id: NetworkObjectId) {
        self.despawn(id);
    }

    /// Routes a health change to the target and, for NPCs, to its brain.
    pub fn receive_hp(
        &mut self,
        target: NetworkObjectId,
        inflicter: Option<NetworkObjectId>,
        amount: i32,
    ) -> Option<LifeState> {
        let character = self.roster.get_mut(target)?;
        let life_state = character.receive_hp(amount);
        debug!(entity = %target, ?inflicter, amount, hp = character.hit_points(), "Health changed");

        if let Some(brain) = self.brains.get_mut(&target) {
            brain.receive_health_change(inflicter, amount);
        }
        if life_state != LifeState::Alive {
            if let Some(player) = self.action_players.get_mut(&target) {
                player.clear_actions();
            }
        }
        Some(life_state)
    }

    pub fn set_stealthy(&mut self, id: NetworkObjectId, stealthy: bool) -> bool {
        match self.roster.get_mut(id) {
            Some(c) => {
                c.set_stealthy(stealthy);
                true
            }
            None => false,
        }
    }

    pub fn set_movement_status(&mut self, id: NetworkObjectId, status: MovementStatus) -> bool {
        match self.roster.get_mut(id) {
            Some(c) => {
                c.set_movement_status(status);
                true
            }
            None => false,
        }
    }

    /// Moves a body directly. Stands in for the external movement system.
    pub fn set_pose(&mut self, id: NetworkObjectId, position: Vec3, rotation: Quat) -> bool {
        match self.roster.get(id) {
            Some(c) => {
                c.body().set_pose(position, rotation);
                true
            }
            None => false,
        }
    }

    /// Spawner override of an NPC's detection range.
    pub fn set_detect_range(&mut self, id: NetworkObjectId, range: f32) -> bool {
        match self.brains.get_mut(&id) {
            Some(brain) => {
                brain.set_detect_range(range);
                true
            }
            None => false,
        }
    }

    /// Issues an action on behalf of any character, e.g. from player input.
    pub fn play_action(&mut self, id: NetworkObjectId, request: ActionRequest) -> bool {
        match self.action_players.get_mut(&id) {
            Some(player) => {
                player.play_action(request);
                true
            }
            None => false,
        }
    }

    pub fn clear_actions(&mut self, id: NetworkObjectId) -> bool {
        match self.action_players.get_mut(&id) {
            Some(player) => {
                player.clear_actions();
                true
            }
            None => false,
        }
    }

    pub fn cancel_actions_by_prototype(&mut self, id: NetworkObjectId, action: ActionId) -> bool {
        match self.action_players.get_mut(&id) {
            Some(player) => {
                player.cancel_by_prototype(action);
                true
            }
            None => false,
        }
    }

    pub fn stop_charging(&mut self, id: NetworkObjectId, percent: f32) -> bool {
        match self.action_players.get_mut(&id) {
            Some(player) => {
                player.stop_charging(percent);
                true
            }
            None => false,
        }
    }

    /// Opens an action event stream for one character.
    pub fn subscribe_actions(
        &mut self,
        id: NetworkObjectId,
    ) -> mpsc::UnboundedReceiver<ActionEventEnvelope> {
        self.broadcaster.subscribe(id)
    }

    /// Runs the server for a number of ticks, paced at the configured rate.
    pub async fn run_for_ticks(&mut self, ticks: u32) -> anyhow::Result<()> {
        let dt = Duration::from_secs_f32(self.cfg.tick_secs());
        let mut next = Instant::now();

        for _ in 0..ticks {
            next += dt;
            self.step(dt.as_secs_f32());
            tokio::time::sleep_until(next).await;
        }
        Ok(())
    }

    /// Executes one fixed simulation step and returns the AI state changes it caused.
    pub fn step(&mut self, dt_sec: f32) -> Vec<(NetworkObjectId, StateChange)> {
        let changes = self.think();
        self.advance_actions(dt_sec);
        self.tick += 1;
        changes
    }

    fn think(&mut self) -> Vec<(NetworkObjectId, StateChange)> {
        let mut changes = Vec::new();
        for (id, brain) in self.brains.iter_mut() {
            let Some(me) = self.roster.get(*id) else {
                continue;
            };
            if !me.is_alive() {
                continue;
            }
            let Some(actions) = self.action_players.get_mut(id) else {
                continue;
            };
            if let Some(change) = brain.update(me, &self.roster, actions) {
                changes.push((*id, change));
            }
        }
        changes
    }

    fn advance_actions(&mut self, dt_sec: f32) {
        let mut ids: Vec<NetworkObjectId> = self.action_players.keys().copied().collect();
        ids.sort();
        for id in ids {
            let Some(player) = self.action_players.get_mut(&id) else {
                continue;
            };
            player.advance(dt_sec);
            for event in player.take_events() {
                self.broadcaster.publish(id, event);
            }
        }
    }
}
