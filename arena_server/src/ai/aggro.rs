//! Hated-enemy bookkeeping for one AI-controlled character.

use arena_shared::entity::NetworkObjectId;

use super::is_appropriate_foe;
use crate::character::Roster;

/// Ordered set of hated enemies.
///
/// Members are pruned lazily: anything that stopped being an appropriate foe is
/// dropped the next time the set is read through [`AggroTracker::hated_enemies`].
#[derive(Debug, Default, Clone)]
pub struct AggroTracker {
    hated: Vec<NetworkObjectId>,
}

impl AggroTracker {
    /// Adds `target` unless already hated. Returns whether it was inserted.
    pub fn hate(&mut self, target: NetworkObjectId) -> bool {
        if self.hated.contains(&target) {
            return false;
        }
        self.hated.push(target);
        true
    }

    /// Evicts invalid members, then returns the remaining ones in insertion order.
    pub fn hated_enemies(&mut self, roster: &Roster) -> &[NetworkObjectId] {
        self.hated.retain(|id| is_appropriate_foe(roster.get(*id)));
        &self.hated
    }

    /// Raw membership, without eviction.
    pub fn contains(&self, target: NetworkObjectId) -> bool {
        self.hated.contains(&target)
    }

    /// Raw size, without eviction.
    pub fn len(&self) -> usize {
        self.hated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hated.is_empty()
    }
}
