//! Configuration system.
//!
//! Loads simulation configuration from JSON strings/files (file IO left to app).

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Root configuration shared by the simulation and viewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed simulation tick rate.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Window over which viewers interpolate pose changes, in seconds.
    #[serde(default = "default_lerp_time_secs")]
    pub lerp_time_secs: f32,
    /// Seed for AI attack selection.
    #[serde(default)]
    pub ai_seed: u64,
}

fn default_tick_hz() -> u32 {
    30
}

fn default_lerp_time_secs() -> f32 {
    0.08
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            lerp_time_secs: default_lerp_time_secs(),
            ai_seed: 0,
        }
    }
}

impl SimConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// Length of one simulation tick, in seconds.
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }
}
