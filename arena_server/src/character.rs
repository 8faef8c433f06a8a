//! Authoritative characters and the roster that owns them.

use std::collections::BTreeMap;

use arena_shared::{
    character::{CharacterType, LifeState, MovementStatus},
    entity::{ClientId, NetworkObjectId},
    math::Vec3,
    physics::BodyHandle,
};
use tracing::info;

/// Server-side state of one character.
#[derive(Debug)]
pub struct ServerCharacter {
    id: NetworkObjectId,
    character_type: CharacterType,
    owner: ClientId,
    is_npc: bool,
    hit_points: i32,
    max_hp: i32,
    life_state: LifeState,
    is_stealthy: bool,
    movement_status: MovementStatus,
    body: BodyHandle,
}

impl ServerCharacter {
    pub fn new(
        id: NetworkObjectId,
        character_type: CharacterType,
        owner: ClientId,
        is_npc: bool,
        max_hp: i32,
        body: BodyHandle,
    ) -> Self {
        Self {
            id,
            character_type,
            owner,
            is_npc,
            hit_points: max_hp,
            max_hp,
            life_state: LifeState::Alive,
            is_stealthy: false,
            movement_status: MovementStatus::Idle,
            body,
        }
    }

    pub fn id(&self) -> NetworkObjectId {
        self.id
    }

    pub fn character_type(&self) -> CharacterType {
        self.character_type
    }

    pub fn owner(&self) -> ClientId {
        self.owner
    }

    pub fn is_npc(&self) -> bool {
        self.is_npc
    }

    pub fn hit_points(&self) -> i32 {
        self.hit_points
    }

    pub fn life_state(&self) -> LifeState {
        self.life_state
    }

    pub fn is_alive(&self) -> bool {
        self.life_state == LifeState::Alive
    }

    pub fn is_stealthy(&self) -> bool {
        self.is_stealthy
    }

    pub fn set_stealthy(&mut self, stealthy: bool) {
        self.is_stealthy = stealthy;
    }

    pub fn movement_status(&self) -> MovementStatus {
        self.movement_status
    }

    pub fn set_movement_status(&mut self, status: MovementStatus) {
        self.movement_status = status;
    }

    pub fn body(&self) -> &BodyHandle {
        &self.body
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    /// Applies a health change. Negative is damage, positive is healing.
    ///
    /// Only living characters are affected. At zero hit points players faint and
    /// NPCs die.
    pub fn receive_hp(&mut self, amount: i32) -> LifeState {
        if self.life_state != LifeState::Alive {
            return self.life_state;
        }

        self.hit_points = (self.hit_points + amount).clamp(0, self.max_hp);
        if self.hit_points == 0 {
            self.life_state = if self.is_npc {
                LifeState::Dead
            } else {
                LifeState::Fainted
            };
            info!(entity = %self.id, life_state = ?self.life_state, "Character went down");
        }
        self.life_state
    }

    pub fn set_life_state(&mut self, life_state: LifeState) {
        self.life_state = life_state;
    }
}

/// Every live character in the simulation, ordered by id.
#[derive(Debug, Default)]
pub struct Roster {
    characters: BTreeMap<NetworkObjectId, ServerCharacter>,
}

impl Roster {
    pub fn insert(&mut self, character: ServerCharacter) {
        self.characters.insert(character.id(), character);
    }

    pub fn remove(&mut self, id: NetworkObjectId) -> Option<ServerCharacter> {
        self.characters.remove(&id)
    }

    pub fn get(&self, id: NetworkObjectId) -> Option<&ServerCharacter> {
        self.characters.get(&id)
    }

    pub fn get_mut(&mut self, id: NetworkObjectId) -> Option<&mut ServerCharacter> {
        self.characters.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerCharacter> {
        self.characters.values()
    }

    /// Player-controlled characters, in id order.
    pub fn players(&self) -> impl Iterator<Item = &ServerCharacter> {
        self.iter().filter(|c| !c.is_npc())
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
