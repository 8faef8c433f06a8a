//! NPC decision making.
//!
//! Each AI-controlled character owns an [`AiBrain`]. Once per simulation tick the
//! brain scans its states in fixed priority order, activates the first eligible
//! one, and lets it run. Transitions only ever happen at tick boundaries.
//!
//! ```text
//!   Attack  (hated enemy within detection range)
//!   Idle    (always eligible; fallback)
//! ```

mod aggro;
mod attack;
mod idle;

use std::sync::Arc;

use arena_shared::{entity::NetworkObjectId, game_data::GameData};
use tracing::{debug, error, warn};

pub use aggro::AggroTracker;
pub use attack::AttackState;
pub use idle::IdleState;

use crate::{
    action_player::ActionSink,
    character::{Roster, ServerCharacter},
};

/// Sentinel accepted by [`AiBrain::set_detect_range`] meaning "no override".
pub const NO_DETECT_RANGE_OVERRIDE: f32 = -1.0;

/// Behavior variants, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiStateType {
    Attack,
    Idle,
}

impl AiStateType {
    /// Highest priority first. Idle must stay last.
    pub const PRIORITY: [AiStateType; 2] = [AiStateType::Attack, AiStateType::Idle];
}

/// Everything a state may look at or act on during one tick.
pub struct AiContext<'a> {
    pub me: &'a ServerCharacter,
    pub roster: &'a Roster,
    pub data: &'a GameData,
    pub actions: &'a mut dyn ActionSink,
    pub aggro: &'a mut AggroTracker,
    pub detect_range: f32,
}

impl AiContext<'_> {
    /// Hated enemies after eviction of invalid ones.
    pub fn hated_enemies(&mut self) -> &[NetworkObjectId] {
        self.aggro.hated_enemies(self.roster)
    }

    pub fn in_detect_range(&self, other: &ServerCharacter) -> bool {
        let range_sq = self.detect_range * self.detect_range;
        self.me.position().distance_sq(other.position()) <= range_sq
    }

    /// Nearest valid hated enemy within detection range. Ties go to the lower id.
    pub fn nearest_hated_in_range(&mut self) -> Option<NetworkObjectId> {
        let origin = self.me.position();
        let roster = self.roster;
        let range_sq = self.detect_range * self.detect_range;

        self.aggro
            .hated_enemies(roster)
            .iter()
            .filter_map(|id| roster.get(*id))
            .map(|c| (origin.distance_sq(c.position()), c.id()))
            .filter(|(d, _)| *d <= range_sq)
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }
}

/// A behavior variant.
pub trait AiState {
    /// Whether this state can become, or remain, the active one.
    fn is_eligible(&mut self, ctx: &mut AiContext<'_>) -> bool;

    /// Called once each time the state becomes active, before its first `update`.
    fn initialize(&mut self, ctx: &mut AiContext<'_>);

    /// Called once per tick while active.
    fn update(&mut self, ctx: &mut AiContext<'_>);
}

#[derive(Debug)]
struct AiLogics {
    attack: AttackState,
    idle: IdleState,
}

impl AiLogics {
    fn get_mut(&mut self, state: AiStateType) -> &mut dyn AiState {
        match state {
            AiStateType::Attack => &mut self.attack,
            AiStateType::Idle => &mut self.idle,
        }
    }
}

/// Returned by [`AiBrain::update`] when the active state changed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: AiStateType,
    pub to: AiStateType,
}

/// True if it is appropriate for an NPC to go after `candidate` from now on.
///
/// Line of sight is not checked.
pub fn is_appropriate_foe(candidate: Option<&ServerCharacter>) -> bool {
    match candidate {
        Some(c) => !c.is_npc() && c.is_alive() && !c.is_stealthy(),
        None => false,
    }
}

/// Decision loop for one NPC.
#[derive(Debug)]
pub struct AiBrain {
    owner: NetworkObjectId,
    data: Arc<GameData>,
    current: AiStateType,
    logics: AiLogics,
    aggro: AggroTracker,
    detect_range_override: Option<f32>,
}

impl AiBrain {
    pub fn new(me: &ServerCharacter, data: Arc<GameData>, seed: u64) -> Self {
        Self {
            owner: me.id(),
            data,
            current: AiStateType::Idle,
            logics: AiLogics {
                attack: AttackState::new(seed ^ me.id().0),
                idle: IdleState,
            },
            aggro: AggroTracker::default(),
            detect_range_override: None,
        }
    }

    /// Runs one tick: select the best eligible state, initialize it if it is new,
    /// then update it.
    pub fn update(
        &mut self,
        me: &ServerCharacter,
        roster: &Roster,
        actions: &mut dyn ActionSink,
    ) -> Option<StateChange> {
        let detect_range = self.detect_range_for(me);
        let mut ctx = AiContext {
            me,
            roster,
            data: &self.data,
            actions,
            aggro: &mut self.aggro,
            detect_range,
        };

        let new_state = find_best_eligible(&mut self.logics, &mut ctx);
        let change = (new_state != self.current).then_some(StateChange {
            from: self.current,
            to: new_state,
        });
        if change.is_some() {
            debug!(entity = %self.owner, from = ?self.current, to = ?new_state, "AI state change");
            self.logics.get_mut(new_state).initialize(&mut ctx);
        }
        self.current = new_state;
        self.logics.get_mut(self.current).update(&mut ctx);
        change
    }

    pub fn current_state(&self) -> AiStateType {
        self.current
    }

    /// Foe currently engaged by the attack state.
    pub fn current_foe(&self) -> Option<NetworkObjectId> {
        match self.current {
            AiStateType::Attack => self.logics.attack.foe(),
            AiStateType::Idle => None,
        }
    }

    /// Damage (negative `amount`) from a known inflicter makes us hate them.
    pub fn receive_health_change(&mut self, inflicter: Option<NetworkObjectId>, amount: i32) {
        if let Some(inflicter) = inflicter {
            if amount < 0 {
                self.hate(inflicter);
            }
        }
    }

    pub fn hate(&mut self, target: NetworkObjectId) {
        if self.aggro.hate(target) {
            debug!(entity = %self.owner, target = %target, "Now hating");
        }
    }

    /// Hated enemies after evicting invalid members. Treat as read-only; a later
    /// call may return fewer entries.
    pub fn hated_enemies(&mut self, roster: &Roster) -> &[NetworkObjectId] {
        self.aggro.hated_enemies(roster)
    }

    pub fn aggro(&self) -> &AggroTracker {
        &self.aggro
    }

    /// Detection range: the override if one is set, else the class value.
    pub fn detect_range(&self, me: &ServerCharacter) -> f32 {
        self.detect_range_for(me)
    }

    /// Overrides the detection range. [`NO_DETECT_RANGE_OVERRIDE`] clears it.
    pub fn set_detect_range(&mut self, range: f32) {
        self.detect_range_override = (range != NO_DETECT_RANGE_OVERRIDE).then_some(range);
    }

    fn detect_range_for(&self, me: &ServerCharacter) -> f32 {
        if let Some(range) = self.detect_range_override {
            return range;
        }
        match self.data.character_class(me.character_type()) {
            Ok(class) => class.detect_range,
            Err(e) => {
                warn!(entity = %self.owner, error = %e, "No detection range; treating as zero");
                0.0
            }
        }
    }
}

fn find_best_eligible(logics: &mut AiLogics, ctx: &mut AiContext<'_>) -> AiStateType {
    for state in AiStateType::PRIORITY {
        if logics.get_mut(state).is_eligible(ctx) {
            return state;
        }
    }

    error!(entity = %ctx.me.id(), "No AI states are eligible; forcing idle");
    AiStateType::Idle
}
