//! Headless arena runner.
//!
//! Usage:
//!   cargo run -p arena_tests --bin arena_sim -- \
//!       [--config sim.json] [--tick-hz 30] [--ticks 90] [--seed 7]
//!
//! Spawns a tank next to an imp, lets the tank land a hit, and runs the
//! simulation with a host-side viewer attached to the imp. AI state changes and
//! the viewer's pose are logged as they happen.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use arena_client::{
    action_viz::ClientActionPlayer, visual::HeadlessAnimator, ClientCharacter, ReconcileSettings,
    ReplicatedState, ViewerRole,
};
use arena_server::{Simulation, SpawnParams};
use arena_shared::{
    character::CharacterType, config::SimConfig, game_data::GameData, math::Vec3,
    physics::PhysicsRegistry,
};
use tracing::{debug, info};

struct Args {
    config: Option<PathBuf>,
    tick_hz: Option<u32>,
    ticks: u32,
    seed: Option<u64>,
}

fn parse_args() -> Args {
    let mut out = Args {
        config: None,
        tick_hz: None,
        ticks: 90,
        seed: None,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--tick-hz" if i + 1 < args.len() => {
                out.tick_hz = args[i + 1].parse().ok();
                i += 2;
            }
            "--ticks" if i + 1 < args.len() => {
                out.ticks = args[i + 1].parse().unwrap_or(90);
                i += 2;
            }
            "--seed" if i + 1 < args.len() => {
                out.seed = args[i + 1].parse().ok();
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let mut cfg = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(hz) = args.tick_hz {
        cfg.tick_hz = hz;
    }
    if let Some(seed) = args.seed {
        cfg.ai_seed = seed;
    }
    info!(
        tick_hz = cfg.tick_hz,
        lerp_time_secs = cfg.lerp_time_secs,
        ticks = args.ticks,
        "Starting simulation"
    );

    let registry = PhysicsRegistry::new();
    let mut sim = Simulation::new(cfg.clone(), Arc::new(GameData::builtin()), registry.clone());

    let imp = sim
        .spawn_character(SpawnParams::new(CharacterType::Imp, Vec3::ZERO))
        .context("spawn imp")?;
    let tank = sim
        .spawn_character(SpawnParams::new(CharacterType::Tank, Vec3::new(4.0, 0.0, 0.0)))
        .context("spawn tank")?;

    let state = {
        let c = sim.character(imp).context("imp missing after spawn")?;
        ReplicatedState {
            is_npc: c.is_npc(),
            movement_status: c.movement_status(),
            life_state: c.life_state(),
            is_stealthy: c.is_stealthy(),
        }
    };
    let mut viewer = ClientCharacter::attach(
        imp,
        registry,
        ViewerRole::HOST_OBSERVER,
        state,
        ReconcileSettings {
            lerp_time_secs: cfg.lerp_time_secs,
            general_target_action: Some(sim.data().general_target_action()),
            ..Default::default()
        },
        ClientActionPlayer::new(sim.data().clone()),
        HeadlessAnimator::default(),
    )?;
    viewer.connect(sim.subscribe_actions(imp));

    sim.receive_hp(imp, Some(tank), -5);

    let dt = cfg.tick_secs();
    let interval = std::time::Duration::from_secs_f32(dt);
    let mut next_tick = tokio::time::Instant::now();

    for _ in 0..args.ticks {
        for (id, change) in sim.step(dt) {
            info!(
                entity = %id,
                from = ?change.from,
                to = ?change.to,
                tick = sim.tick(),
                "AI state changed"
            );
        }
        if let Some(pose) = viewer.frame(dt) {
            let playing: Vec<String> = viewer
                .visualizer()
                .playing()
                .iter()
                .map(|fx| fx.request.action_id.to_string())
                .collect();
            debug!(
                tick = sim.tick(),
                x = pose.position.x,
                z = pose.position.z,
                ?playing,
                "Viewer frame"
            );
        }

        next_tick += interval;
        tokio::time::sleep_until(next_tick).await;
    }

    viewer.detach();
    sim.despawn(imp);
    sim.destroy(tank);
    info!(ticks = sim.tick(), "Simulation finished");
    Ok(())
}
