#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Biscuit Battle.
//!
//! The world owns every biscuit and enemy and is the only place where the
//! claimant/target link between them changes. Adapters and systems mutate it
//! exclusively through [`apply`], and read it through the [`query`] module.

mod arbitration;
mod biscuits;
mod click_rate;
mod enemies;

use std::time::Duration;

use biscuit_battle_core::{ArbitrationTuning, Command, Event};

use biscuits::BiscuitRegistry;
use enemies::EnemyRegistry;

/// Represents the authoritative Biscuit Battle world state.
#[derive(Debug)]
pub struct World {
    tuning: ArbitrationTuning,
    clock: Duration,
    tick_index: u64,
    biscuits: BiscuitRegistry,
    enemies: EnemyRegistry,
}

impl World {
    /// Creates an empty world using the default arbitration tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(ArbitrationTuning::default())
    }

    /// Creates an empty world using the provided arbitration tuning.
    #[must_use]
    pub fn with_tuning(tuning: ArbitrationTuning) -> Self {
        Self {
            tuning,
            clock: Duration::ZERO,
            tick_index: 0,
            biscuits: BiscuitRegistry::new(),
            enemies: EnemyRegistry::new(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureArbitration { tuning } => {
            world.tuning = tuning;
            out_events.push(Event::ArbitrationConfigured { tuning });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let stunned = world.resolve_contests(dt, out_events);
            world.advance_enemies(dt, &stunned, out_events);
        }
        Command::SpawnBiscuit { position } => {
            let biscuit = world.biscuits.spawn(position);
            out_events.push(Event::BiscuitSpawned { biscuit, position });
        }
        Command::SpawnEnemy { position } => {
            let enemy = world.enemies.spawn(position);
            out_events.push(Event::EnemySpawned { enemy, position });
        }
        Command::ClaimBiscuit { enemy, biscuit } => {
            world.begin_claim(enemy, biscuit, out_events);
        }
        Command::DeferSearch { enemy } => world.defer_search(enemy, out_events),
        Command::PressBiscuit { biscuit } => world.press(biscuit, out_events),
        Command::ReleaseBiscuit { biscuit, enemy } => {
            world.release_if_claimant(biscuit, enemy, out_events);
        }
        Command::RemoveBiscuit { biscuit } => world.destroy_biscuit(biscuit, out_events),
        Command::RemoveEnemy { enemy } => world.remove_enemy(enemy, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use biscuit_battle_core::{
        ArbitrationTuning, BiscuitId, BiscuitSnapshot, BiscuitView, EnemyId, EnemySnapshot,
        EnemyView,
    };

    /// Provides read-only access to the active arbitration tuning.
    #[must_use]
    pub fn tuning(world: &World) -> &ArbitrationTuning {
        &world.tuning
    }

    /// Total simulated time elapsed since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied to the world.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of every live biscuit.
    #[must_use]
    pub fn biscuit_view(world: &World) -> BiscuitView {
        BiscuitView::from_snapshots(world.biscuits.iter().map(|biscuit| biscuit.snapshot()).collect())
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Snapshot of a single biscuit, if it is still alive.
    #[must_use]
    pub fn biscuit(world: &World, biscuit: BiscuitId) -> Option<BiscuitSnapshot> {
        world.biscuits.get(biscuit).map(|entry| entry.snapshot())
    }

    /// Snapshot of a single enemy, if it is still alive.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyId) -> Option<EnemySnapshot> {
        world.enemies.get(enemy).map(|entry| entry.snapshot())
    }
}
