use std::sync::Arc;

use arena_server::{Simulation, SpawnParams};
use arena_shared::{
    character::CharacterType, config::SimConfig, game_data::GameData, math::Vec3,
    physics::PhysicsRegistry,
};

/// Smoke test: a populated simulation can run a few paced ticks without panicking.
#[tokio::test]
async fn server_runs_few_ticks() -> anyhow::Result<()> {
    let cfg = SimConfig {
        tick_hz: 64,
        ..Default::default()
    };
    let mut sim = Simulation::new(cfg, Arc::new(GameData::builtin()), PhysicsRegistry::new());
    let imp = sim.spawn_character(SpawnParams::new(CharacterType::Imp, Vec3::ZERO))?;
    sim.spawn_character(SpawnParams::new(CharacterType::Archer, Vec3::new(4.0, 0.0, 0.0)))?;

    sim.run_for_ticks(3).await?;
    assert_eq!(sim.tick(), 3);
    assert!(sim.brain(imp).is_some());
    Ok(())
}
