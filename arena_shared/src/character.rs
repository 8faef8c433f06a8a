//! Character state shared by the authoritative side and viewers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Character archetype, used as the key into static game data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Tank,
    Archer,
    Mage,
    Rogue,
    Imp,
    ImpBoss,
    VandalImp,
}

impl fmt::Display for CharacterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CharacterType::Tank => "tank",
            CharacterType::Archer => "archer",
            CharacterType::Mage => "mage",
            CharacterType::Rogue => "rogue",
            CharacterType::Imp => "imp",
            CharacterType::ImpBoss => "imp_boss",
            CharacterType::VandalImp => "vandal_imp",
        };
        f.write_str(name)
    }
}

/// Whether a character is up, knocked out, or gone for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifeState {
    #[default]
    Alive,
    Fainted,
    Dead,
}

/// Replicated movement status. Drives animation playback speed on viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    #[default]
    Idle,
    Normal,
    Uncontrolled,
    Slowed,
    Hasted,
    Walking,
}

impl MovementStatus {
    pub const ALL: [MovementStatus; 6] = [
        MovementStatus::Idle,
        MovementStatus::Normal,
        MovementStatus::Uncontrolled,
        MovementStatus::Slowed,
        MovementStatus::Hasted,
        MovementStatus::Walking,
    ];
}
