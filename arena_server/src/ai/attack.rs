//! Attack state: pick a foe and keep hitting it.

use arena_shared::{entity::NetworkObjectId, game_data::ActionId, net::ActionRequest};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use super::{AiContext, AiState};

/// Engages the nearest hated enemy inside detection range.
///
/// The foe sticks until it becomes invalid or leaves range. Attacks are drawn at
/// random from the skills whose reuse time has elapsed, using a seeded RNG so a
/// given seed always replays the same choices.
#[derive(Debug)]
pub struct AttackState {
    foe: Option<NetworkObjectId>,
    attack_actions: Vec<ActionId>,
    cur_attack: Option<ActionId>,
    rng: StdRng,
}

impl AttackState {
    pub fn new(seed: u64) -> Self {
        Self {
            foe: None,
            attack_actions: Vec::new(),
            cur_attack: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current target, if any.
    pub fn foe(&self) -> Option<NetworkObjectId> {
        self.foe
    }

    fn foe_still_valid(&self, ctx: &mut AiContext<'_>) -> bool {
        let Some(foe) = self.foe else {
            return false;
        };
        ctx.hated_enemies().contains(&foe)
            && ctx.roster.get(foe).is_some_and(|c| ctx.in_detect_range(c))
    }

    fn choose_attack(&mut self, ctx: &AiContext<'_>) -> Option<ActionId> {
        if self.attack_actions.is_empty() {
            return None;
        }
        let usable: Vec<ActionId> = self
            .attack_actions
            .iter()
            .copied()
            .filter(|a| ctx.actions.is_reuse_time_elapsed(*a))
            .collect();
        if usable.is_empty() {
            return None;
        }
        Some(usable[self.rng.gen_range(0..usable.len())])
    }

    /// True if the active action already serves the current plan.
    fn busy_with(&self, ctx: &AiContext<'_>, foe: NetworkObjectId) -> bool {
        let Some(active) = ctx.actions.active_action() else {
            return false;
        };
        let Ok(proto) = ctx.data.action(active.action_id) else {
            return false;
        };
        let on_foe = active.primary_target() == Some(foe);
        if proto.is_chase_action() || Some(active.action_id) == self.cur_attack {
            return on_foe;
        }
        proto.is_stun_action()
    }
}

impl AiState for AttackState {
    fn is_eligible(&mut self, ctx: &mut AiContext<'_>) -> bool {
        ctx.nearest_hated_in_range().is_some()
    }

    fn initialize(&mut self, ctx: &mut AiContext<'_>) {
        self.foe = None;
        self.attack_actions = ctx
            .data
            .character_class(ctx.me.character_type())
            .map(|class| {
                class
                    .skills
                    .iter()
                    .copied()
                    .filter(|s| ctx.data.action(*s).is_ok())
                    .collect()
            })
            .unwrap_or_default();
        self.cur_attack = self.attack_actions.first().copied();
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) {
        if !self.foe_still_valid(ctx) {
            self.foe = ctx.nearest_hated_in_range();
            debug!(entity = %ctx.me.id(), foe = ?self.foe, "Switching foe");
            ctx.actions.clear_actions();
        }

        let Some(foe) = self.foe else {
            return;
        };

        if self.busy_with(ctx, foe) {
            return;
        }

        self.cur_attack = self.choose_attack(ctx);
        let Some(attack) = self.cur_attack else {
            return;
        };

        ctx.actions.play_action(ActionRequest {
            action_id: attack,
            targets: vec![foe],
            direction: ctx.me.body().transform().forward(),
            should_close: true,
            should_queue: false,
        });
    }
}
