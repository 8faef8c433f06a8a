//! Visualization settings and the animator seam.
//!
//! Animation graph playback is external; viewers only push a playback speed and
//! the occasional trigger through [`CharacterAnimator`].

use std::collections::HashMap;

use arena_shared::character::{LifeState, MovementStatus};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Animation speed table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Playback speed per movement status while alive.
    #[serde(default = "default_speeds")]
    pub speeds: HashMap<MovementStatus, f32>,
    /// Used whenever the character is not alive, regardless of movement status.
    #[serde(default)]
    pub speed_dead: f32,
    /// Release-build stand-in for a status missing from `speeds`.
    #[serde(default = "default_fallback_speed")]
    pub fallback_speed: f32,
}

fn default_speeds() -> HashMap<MovementStatus, f32> {
    HashMap::from([
        (MovementStatus::Idle, 0.0),
        (MovementStatus::Normal, 1.0),
        (MovementStatus::Uncontrolled, 0.0),
        (MovementStatus::Slowed, 2.0),
        (MovementStatus::Hasted, 1.5),
        (MovementStatus::Walking, 0.5),
    ])
}

fn default_fallback_speed() -> f32 {
    1.0
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            speeds: default_speeds(),
            speed_dead: 0.0,
            fallback_speed: default_fallback_speed(),
        }
    }
}

impl VisualizationConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Animation playback speed for the given conditions.
    ///
    /// # Panics
    ///
    /// In debug builds, if `status` has no configured speed. Release builds log and
    /// use `fallback_speed` instead.
    pub fn animation_speed(&self, status: MovementStatus, life_state: LifeState) -> f32 {
        if life_state != LifeState::Alive {
            return self.speed_dead;
        }

        self.speed_for_status(status, cfg!(debug_assertions))
    }

    /// Speed table lookup. A missing status panics when `strict`, otherwise it
    /// logs and yields `fallback_speed`.
    fn speed_for_status(&self, status: MovementStatus, strict: bool) -> f32 {
        match self.speeds.get(&status) {
            Some(speed) => *speed,
            None if strict => {
                panic!("no animation speed configured for movement status {status:?}")
            }
            None => {
                warn!(?status, "No animation speed configured; using fallback");
                self.fallback_speed
            }
        }
    }
}

/// One-shot animator triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorTrigger {
    AnticipateMove,
}

/// Minimal animator surface.
pub trait CharacterAnimator {
    fn set_speed(&mut self, speed: f32);
    fn speed(&self) -> f32;
    fn set_trigger(&mut self, trigger: AnimatorTrigger);
    /// True while every layer sits in its default "nothing playing" node.
    fn in_base_state(&self) -> bool;

    fn is_animating(&self) -> bool {
        self.speed() > 0.0 || !self.in_base_state()
    }
}

/// Animator used headless: remembers what it was told.
#[derive(Debug, Clone)]
pub struct HeadlessAnimator {
    pub speed: f32,
    pub triggers: Vec<AnimatorTrigger>,
    pub in_base_state: bool,
}

impl Default for HeadlessAnimator {
    fn default() -> Self {
        Self {
            speed: 0.0,
            triggers: Vec::new(),
            in_base_state: true,
        }
    }
}

impl CharacterAnimator for HeadlessAnimator {
    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_trigger(&mut self, trigger: AnimatorTrigger) {
        self.triggers.push(trigger);
    }

    fn in_base_state(&self) -> bool {
        self.in_base_state
    }
}

/// Material override applied to a character model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialMaterialMode {
    #[default]
    None,
    /// Seen by its own player: translucent.
    StealthySelf,
    /// Seen by everyone else: hidden.
    StealthyOther,
}

impl SpecialMaterialMode {
    pub fn for_viewer(is_stealthy: bool, is_owner: bool) -> Self {
        match (is_stealthy, is_owner) {
            (false, _) => SpecialMaterialMode::None,
            (true, true) => SpecialMaterialMode::StealthySelf,
            (true, false) => SpecialMaterialMode::StealthyOther,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(MovementStatus::Idle, 0.0)]
    #[case(MovementStatus::Normal, 1.0)]
    #[case(MovementStatus::Uncontrolled, 0.0)]
    #[case(MovementStatus::Slowed, 2.0)]
    #[case(MovementStatus::Hasted, 1.5)]
    #[case(MovementStatus::Walking, 0.5)]
    fn alive_speed_follows_table(#[case] status: MovementStatus, #[case] expected: f32) {
        let cfg = VisualizationConfig::default();
        assert_eq!(cfg.animation_speed(status, LifeState::Alive), expected);
    }

    #[rstest]
    #[case(LifeState::Fainted)]
    #[case(LifeState::Dead)]
    fn down_overrides_movement(#[case] life_state: LifeState) {
        let cfg = VisualizationConfig {
            speed_dead: 0.25,
            ..Default::default()
        };
        for status in MovementStatus::ALL {
            assert_eq!(cfg.animation_speed(status, life_state), 0.25);
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "no animation speed configured")]
    fn missing_status_is_loud_in_debug() {
        let mut cfg = VisualizationConfig::default();
        cfg.speeds.remove(&MovementStatus::Hasted);
        cfg.animation_speed(MovementStatus::Hasted, LifeState::Alive);
    }

    #[test]
    fn missing_status_falls_back_when_lenient() {
        let mut cfg = VisualizationConfig {
            fallback_speed: 0.75,
            ..Default::default()
        };
        cfg.speeds.remove(&MovementStatus::Walking);
        assert_eq!(cfg.speed_for_status(MovementStatus::Walking, false), 0.75);
        assert_eq!(cfg.speed_for_status(MovementStatus::Normal, false), 1.0);
    }

    #[test]
    #[should_panic(expected = "no animation speed configured")]
    fn missing_status_panics_when_strict() {
        let mut cfg = VisualizationConfig::default();
        cfg.speeds.remove(&MovementStatus::Walking);
        cfg.speed_for_status(MovementStatus::Walking, true);
    }

    #[test]
    fn json_overrides_speeds() {
        let cfg = VisualizationConfig::from_json_str(
            r#"{ "speeds": { "normal": 1.2, "idle": 0.0 }, "speed_dead": 0.1 }"#,
        )
        .unwrap();
        assert_eq!(cfg.animation_speed(MovementStatus::Normal, LifeState::Alive), 1.2);
        assert_eq!(cfg.animation_speed(MovementStatus::Idle, LifeState::Dead), 0.1);
        assert_eq!(cfg.fallback_speed, 1.0);
    }

    #[test]
    fn stealth_appearance_depends_on_owner() {
        assert_eq!(SpecialMaterialMode::for_viewer(false, true), SpecialMaterialMode::None);
        assert_eq!(
            SpecialMaterialMode::for_viewer(true, true),
            SpecialMaterialMode::StealthySelf
        );
        assert_eq!(
            SpecialMaterialMode::for_viewer(true, false),
            SpecialMaterialMode::StealthyOther
        );
    }
}
