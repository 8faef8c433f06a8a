//! Fallback state. Always eligible; watches for players wandering into range.

use super::{is_appropriate_foe, AiContext, AiState};

#[derive(Debug, Default)]
pub struct IdleState;

impl IdleState {
    /// Hates every appropriate player within detection range.
    fn detect_foes(ctx: &mut AiContext<'_>) {
        let range_sq = ctx.detect_range * ctx.detect_range;
        let origin = ctx.me.position();
        for player in ctx.roster.players() {
            if is_appropriate_foe(Some(player))
                && origin.distance_sq(player.position()) <= range_sq
            {
                ctx.aggro.hate(player.id());
            }
        }
    }
}

impl AiState for IdleState {
    fn is_eligible(&mut self, _ctx: &mut AiContext<'_>) -> bool {
        true
    }

    fn initialize(&mut self, _ctx: &mut AiContext<'_>) {}

    fn update(&mut self, ctx: &mut AiContext<'_>) {
        Self::detect_foes(ctx);
    }
}
