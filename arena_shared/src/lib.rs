//! `arena_shared`
//!
//! Shared libraries used by both the authoritative simulation and viewers.
//!
//! Design goals:
//! - Deterministic and modular where practical.
//! - Clear separation of concerns (ids, math, physics bodies, game data, wire types).
//! - Process-scoped stores passed by handle, never ambient globals.
//! - No `unsafe`.

pub mod character;
pub mod config;
pub mod entity;
pub mod event;
pub mod game_data;
pub mod math;
pub mod net;
pub mod physics;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::character::*;
    pub use crate::config::*;
    pub use crate::entity::*;
    pub use crate::game_data::{ActionId, ActionPrototype, CharacterClass, GameData};
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::physics::*;
}
