#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use biscuit_battle_core::{Command, Event, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default cadence between enemy spawns.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(15);

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    visible_min: Position,
    visible_max: Position,
    offscreen_margin: f32,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    ///
    /// The visible region is given by two opposite corners in any order.
    #[must_use]
    pub fn new(
        spawn_interval: Duration,
        rng_seed: u64,
        corner_a: Position,
        corner_b: Position,
        offscreen_margin: f32,
    ) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            visible_min: Position::new(corner_a.x().min(corner_b.x()), corner_a.y().min(corner_b.y())),
            visible_max: Position::new(corner_a.x().max(corner_b.x()), corner_a.y().max(corner_b.y())),
            offscreen_margin: offscreen_margin.max(0.0),
        }
    }
}

/// Edge of the visible region an enemy enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

const EDGES: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top];

/// Pure system that deterministically emits enemy spawn commands.
///
/// The first pass that observes time emits one enemy at once; afterwards one
/// enemy is emitted per elapsed interval.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    accumulator: Duration,
    started: bool,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            started: false,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        let mut observed = false;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
                observed = true;
            }
        }

        if !observed {
            return;
        }

        if !self.started {
            self.started = true;
            let position = self.next_position();
            out.push(Command::SpawnEnemy { position });
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        for _ in 0..self.resolve_spawn_attempts() {
            let position = self.next_position();
            out.push(Command::SpawnEnemy { position });
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.config.spawn_interval.is_zero() {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.config.spawn_interval {
            self.accumulator -= self.config.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn next_position(&mut self) -> Position {
        let min = self.config.visible_min;
        let max = self.config.visible_max;
        let margin = self.config.offscreen_margin;

        let edge = EDGES[self.rng.gen_range(0..EDGES.len())];
        let along: f32 = self.rng.gen();
        match edge {
            Edge::Left => Position::new(min.x() - margin, lerp(min.y(), max.y(), along)),
            Edge::Right => Position::new(max.x() + margin, lerp(min.y(), max.y(), along)),
            Edge::Bottom => Position::new(lerp(min.x(), max.x(), along), min.y() - margin),
            Edge::Top => Position::new(lerp(min.x(), max.x(), along), max.y() + margin),
        }
    }
}

/// Convex combination of `min` and `max`; never forms `max - min`.
fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min.mul_add(1.0 - t, max * t)
}
