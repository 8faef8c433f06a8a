//! `arena_server`
//!
//! Authoritative-side systems:
//! - Fixed timestep simulation loop
//! - Character lifecycle (spawn/despawn/destroy) and the physics registry hooks
//! - NPC decision making and aggro tracking
//! - Action execution bookkeeping
//! - Action event fan-out to viewers
//!
//! Scheduling model: everything here runs synchronously inside one simulation
//! tick. Within a tick, state selection happens before the state update.

pub mod action_player;
pub mod ai;
pub mod broadcast;
pub mod character;
pub mod server;

pub use server::{Simulation, SpawnParams};
