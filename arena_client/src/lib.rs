//! `arena_client`
//!
//! Viewer-side systems:
//! - Pose smoothing toward the authoritative physics body
//! - Animation speed from replicated movement and life state
//! - Ordered, exactly-once replay of action and animation events
//! - Local anticipation of the owner's own input

pub mod action_viz;
pub mod client;
pub mod input;
pub mod lerp;
pub mod visual;

pub use client::{ClientCharacter, Pose, ReconcileSettings, ReplicatedState, ViewerRole};
