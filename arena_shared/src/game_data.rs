//! Static game data.
//!
//! Read-only tables describing character archetypes and action prototypes. Loaded
//! from JSON by the app, or taken from the built-in set used by tests and the
//! headless runner.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::character::CharacterType;

/// Action prototype id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u32);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action:{}", self.0)
    }
}

/// What an action does once executed. Execution itself lives outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionLogic {
    Target,
    Chase,
    Melee,
    RangedTargeted,
    ChargedShield,
    Trample,
    Stealth,
    Stunned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPrototype {
    pub id: ActionId,
    pub name: String,
    pub logic: ActionLogic,
    /// How long the action stays active once started. Zero means "until replaced".
    #[serde(default)]
    pub duration_secs: f32,
    /// Minimum time between two starts of this action.
    #[serde(default)]
    pub reuse_time_secs: f32,
}

impl ActionPrototype {
    pub fn is_chase_action(&self) -> bool {
        self.logic == ActionLogic::Chase
    }

    pub fn is_stun_action(&self) -> bool {
        self.logic == ActionLogic::Stunned
    }
}

/// Per-archetype configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub character_type: CharacterType,
    pub display_name: String,
    pub base_hp: i32,
    /// Range, in meters, within which this character notices foes.
    pub detect_range: f32,
    pub is_npc: bool,
    /// Attack skills, in preference order.
    #[serde(default)]
    pub skills: Vec<ActionId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameDataError {
    #[error("no character class configured for {0}")]
    UnknownCharacter(CharacterType),

    #[error("no action prototype configured for {0}")]
    UnknownAction(ActionId),
}

#[derive(Serialize, Deserialize)]
struct GameDataFile {
    characters: Vec<CharacterClass>,
    actions: Vec<ActionPrototype>,
    general_target_action: ActionId,
}

/// All static tables.
#[derive(Debug, Clone)]
pub struct GameData {
    characters: HashMap<CharacterType, CharacterClass>,
    actions: HashMap<ActionId, ActionPrototype>,
    general_target_action: ActionId,
}

pub const GENERAL_TARGET: ActionId = ActionId(1);
pub const GENERAL_CHASE: ActionId = ActionId(2);
pub const IMP_MELEE: ActionId = ActionId(10);
pub const IMP_BOSS_MELEE: ActionId = ActionId(11);
pub const IMP_BOSS_TRAMPLE: ActionId = ActionId(12);
pub const TANK_MELEE: ActionId = ActionId(20);
pub const TANK_SHIELD: ActionId = ActionId(21);
pub const ARCHER_SHOT: ActionId = ActionId(30);
pub const MAGE_BOLT: ActionId = ActionId(40);
pub const ROGUE_STEALTH: ActionId = ActionId(50);
pub const STUNNED: ActionId = ActionId(60);

impl GameData {
    /// Parses game data from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        let file: GameDataFile = serde_json::from_str(s)?;
        Ok(Self::from_tables(
            file.characters,
            file.actions,
            file.general_target_action,
        ))
    }

    pub fn from_tables(
        characters: Vec<CharacterClass>,
        actions: Vec<ActionPrototype>,
        general_target_action: ActionId,
    ) -> Self {
        Self {
            characters: characters
                .into_iter()
                .map(|c| (c.character_type, c))
                .collect(),
            actions: actions.into_iter().map(|a| (a.id, a)).collect(),
            general_target_action,
        }
    }

    /// Built-in data set: four player classes and three imp variants.
    pub fn builtin() -> Self {
        fn action(
            id: ActionId,
            name: &str,
            logic: ActionLogic,
            duration: f32,
            reuse: f32,
        ) -> ActionPrototype {
            ActionPrototype {
                id,
                name: name.to_string(),
                logic,
                duration_secs: duration,
                reuse_time_secs: reuse,
            }
        }

        fn class(
            character_type: CharacterType,
            base_hp: i32,
            detect_range: f32,
            is_npc: bool,
            skills: &[ActionId],
        ) -> CharacterClass {
            CharacterClass {
                character_type,
                display_name: character_type.to_string(),
                base_hp,
                detect_range,
                is_npc,
                skills: skills.to_vec(),
            }
        }

        let actions = vec![
            action(GENERAL_TARGET, "general_target", ActionLogic::Target, 0.0, 0.0),
            action(GENERAL_CHASE, "general_chase", ActionLogic::Chase, 0.0, 0.0),
            action(IMP_MELEE, "imp_melee", ActionLogic::Melee, 0.6, 0.8),
            action(IMP_BOSS_MELEE, "imp_boss_melee", ActionLogic::Melee, 0.9, 1.2),
            action(IMP_BOSS_TRAMPLE, "imp_boss_trample", ActionLogic::Trample, 1.5, 6.0),
            action(TANK_MELEE, "tank_melee", ActionLogic::Melee, 0.5, 0.5),
            action(TANK_SHIELD, "tank_shield", ActionLogic::ChargedShield, 3.0, 4.0),
            action(ARCHER_SHOT, "archer_shot", ActionLogic::RangedTargeted, 0.4, 0.6),
            action(MAGE_BOLT, "mage_bolt", ActionLogic::RangedTargeted, 0.5, 0.9),
            action(ROGUE_STEALTH, "rogue_stealth", ActionLogic::Stealth, 10.0, 12.0),
            action(STUNNED, "stunned", ActionLogic::Stunned, 2.0, 0.0),
        ];

        let characters = vec![
            class(CharacterType::Tank, 500, 0.0, false, &[TANK_MELEE, TANK_SHIELD]),
            class(CharacterType::Archer, 300, 0.0, false, &[ARCHER_SHOT]),
            class(CharacterType::Mage, 250, 0.0, false, &[MAGE_BOLT]),
            class(CharacterType::Rogue, 300, 0.0, false, &[ROGUE_STEALTH]),
            class(CharacterType::Imp, 100, 8.0, true, &[IMP_MELEE]),
            class(
                CharacterType::ImpBoss,
                1200,
                12.0,
                true,
                &[IMP_BOSS_MELEE, IMP_BOSS_TRAMPLE],
            ),
            class(CharacterType::VandalImp, 80, 6.0, true, &[IMP_MELEE]),
        ];

        Self::from_tables(characters, actions, GENERAL_TARGET)
    }

    pub fn character_class(&self, t: CharacterType) -> Result<&CharacterClass, GameDataError> {
        self.characters
            .get(&t)
            .ok_or(GameDataError::UnknownCharacter(t))
    }

    pub fn action(&self, id: ActionId) -> Result<&ActionPrototype, GameDataError> {
        self.actions.get(&id).ok_or(GameDataError::UnknownAction(id))
    }

    /// Action every owning viewer plays locally on attach.
    pub fn general_target_action(&self) -> ActionId {
        self.general_target_action
    }
}

impl Default for GameData {
    fn default() -> Self {
        Self::builtin()
    }
}
