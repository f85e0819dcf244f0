//! Frame loop that drives the world, its systems and a scripted player.

use std::{collections::BTreeMap, fmt, time::Duration};

use anyhow::{Context, Result};
use biscuit_battle_core::{
    BiscuitId, BiscuitSnapshot, BiscuitState, BiscuitView, Command, EnemyId, Event, Position,
};
use biscuit_battle_presentation::{BobPose, PresentationBackend, Presenter};
use biscuit_battle_system_scoring::Scoreboard;
use biscuit_battle_system_spawning::{Config as SpawnConfig, Spawning};
use biscuit_battle_system_targeting::Targeting;
use biscuit_battle_world::{self as world, query, World};
use clap::ValueEnum;
use glam::Vec2;
use tracing::{info, trace};

use crate::config::Settings;

/// Time a walking-away player leaves a contest before releasing the biscuit.
const WALK_AWAY: Duration = Duration::from_secs(4);
/// Presses per second the mashing player adds above the win threshold.
const MASH_HEADROOM: f32 = 2.0;

/// Behaviour of the scripted player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// Never touches a biscuit; enemies consume everything.
    Idle,
    /// Contests every claim and mashes above the win threshold.
    Mash,
    /// Contests every claim, stops pressing, then releases it.
    WalkAway,
}

/// Counters collected over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    frames: u64,
    simulated: Duration,
    enemies_spawned: u32,
    claims: u32,
    contests: u32,
    consumed: u32,
    wins: u32,
    releases: u32,
    despawned: u32,
    score: i64,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemySpawned { .. } => self.enemies_spawned += 1,
            Event::ClaimStarted { .. } => self.claims += 1,
            Event::ClaimContested { .. } => self.contests += 1,
            Event::BiscuitConsumed { .. } => self.consumed += 1,
            Event::PlayerWon { .. } => self.wins += 1,
            Event::ClaimReleased { .. } => self.releases += 1,
            Event::EnemyDespawned { .. } => self.despawned += 1,
            _ => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames: {}", self.frames)?;
        writeln!(f, "simulated: {:.3}s", self.simulated.as_secs_f64())?;
        writeln!(f, "enemies spawned: {}", self.enemies_spawned)?;
        writeln!(f, "claims: {}", self.claims)?;
        writeln!(f, "contests: {}", self.contests)?;
        writeln!(f, "consumed: {}", self.consumed)?;
        writeln!(f, "wins: {}", self.wins)?;
        writeln!(f, "releases: {}", self.releases)?;
        writeln!(f, "despawned: {}", self.despawned)?;
        write!(f, "score: {}", self.score)
    }
}

/// Owns the world and every system for a headless run.
pub(crate) struct Simulation {
    world: World,
    targeting: Targeting,
    spawning: Spawning,
    scoreboard: Scoreboard,
    presenter: Presenter,
    backend: TraceBackend,
    player: ScriptedPlayer,
    summary: Summary,
}

impl Simulation {
    /// Builds a world seeded with `biscuits` evenly spaced across the view.
    pub(crate) fn new(
        settings: &Settings,
        seed: u64,
        scenario: Scenario,
        biscuits: u32,
    ) -> Result<Self> {
        let spawn = settings.spawning;
        let mut simulation = Self {
            world: World::with_tuning(settings.tuning),
            targeting: Targeting::new(),
            spawning: Spawning::new(SpawnConfig::new(
                spawn.interval,
                seed,
                spawn.visible_min,
                spawn.visible_max,
                spawn.offscreen_margin,
            )),
            scoreboard: Scoreboard::new(),
            presenter: Presenter::new(),
            backend: TraceBackend,
            player: ScriptedPlayer::new(scenario, settings.tuning.rate_per_second_for_max),
            summary: Summary::default(),
        };

        let span = spawn.visible_max.x() - spawn.visible_min.x();
        let row = (spawn.visible_min.y() + spawn.visible_max.y()) / 2.0;
        let commands = (0..biscuits)
            .map(|index| {
                let fraction = (index + 1) as f32 / (biscuits + 1) as f32;
                Command::SpawnBiscuit {
                    position: Position::new(spawn.visible_min.x() + span * fraction, row),
                }
            })
            .collect();
        simulation.dispatch(commands)?;
        Ok(simulation)
    }

    /// Advances every part of the simulation by one frame.
    pub(crate) fn step(&mut self, dt: Duration) -> Result<()> {
        let mut events = Vec::new();

        let biscuits = query::biscuit_view(&self.world);
        let clock = query::clock(&self.world);
        for command in self.player.plan(clock, dt, &biscuits) {
            world::apply(&mut self.world, command, &mut events);
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        let enemies = query::enemy_view(&self.world);
        let biscuits = query::biscuit_view(&self.world);
        self.targeting
            .handle(&events, &enemies, &biscuits, &mut commands);
        self.spawning.handle(&events, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        self.settle(&events)?;
        self.summary.frames += 1;
        self.summary.simulated = query::clock(&self.world);
        Ok(())
    }

    /// Counters gathered so far.
    pub(crate) fn summary(&self) -> Summary {
        self.summary
    }

    fn dispatch(&mut self, commands: Vec<Command>) -> Result<()> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.settle(&events)
    }

    /// Feeds a finished batch of events to scoring, presentation and the log.
    fn settle(&mut self, events: &[Event]) -> Result<()> {
        let mut changes = Vec::new();
        self.scoreboard.handle(events, &mut changes);
        for change in changes {
            info!(score = change.score, "score changed");
        }

        self.presenter
            .handle(
                events,
                &query::biscuit_view(&self.world),
                &query::enemy_view(&self.world),
                query::tuning(&self.world).fade_duration,
                &mut self.backend,
            )
            .context("failed to present frame")?;

        for event in events {
            log_event(event);
            self.summary.record(event);
        }
        self.summary.score = self.scoreboard.score();
        Ok(())
    }
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } | Event::ContestProgressed { .. } => {
            trace!(?event, "world event");
        }
        _ => info!(?event, "world event"),
    }
}

/// Player stand-in that presses biscuits according to a [`Scenario`].
#[derive(Debug)]
struct ScriptedPlayer {
    scenario: Scenario,
    press_interval: Duration,
    press_timer: Duration,
    contested_at: BTreeMap<BiscuitId, Duration>,
}

impl ScriptedPlayer {
    fn new(scenario: Scenario, rate_per_second_for_max: f32) -> Self {
        let presses_per_second = rate_per_second_for_max.max(1.0) + MASH_HEADROOM;
        Self {
            scenario,
            press_interval: Duration::from_secs_f32(1.0 / presses_per_second),
            press_timer: Duration::ZERO,
            contested_at: BTreeMap::new(),
        }
    }

    fn plan(&mut self, clock: Duration, dt: Duration, biscuits: &BiscuitView) -> Vec<Command> {
        let mut commands = Vec::new();
        self.contested_at
            .retain(|biscuit, _| biscuits.get(*biscuit).is_some_and(is_contested));

        match self.scenario {
            Scenario::Idle => {}
            Scenario::Mash => {
                self.press_timer = self.press_timer.saturating_add(dt);
                for snapshot in biscuits.iter() {
                    match snapshot.state {
                        BiscuitState::Claimed => commands.push(Command::PressBiscuit {
                            biscuit: snapshot.id,
                        }),
                        BiscuitState::Contested if self.press_timer >= self.press_interval => {
                            commands.push(Command::PressBiscuit {
                                biscuit: snapshot.id,
                            });
                        }
                        _ => {}
                    }
                }
                if self.press_timer >= self.press_interval {
                    self.press_timer -= self.press_interval;
                }
            }
            Scenario::WalkAway => {
                for snapshot in biscuits.iter() {
                    match (snapshot.state, snapshot.claimant) {
                        (BiscuitState::Claimed, _) => {
                            let _ = self.contested_at.insert(snapshot.id, clock);
                            commands.push(Command::PressBiscuit {
                                biscuit: snapshot.id,
                            });
                        }
                        (BiscuitState::Contested, Some(enemy)) => {
                            if self.walked_away(snapshot.id, clock) {
                                commands.push(release(snapshot.id, enemy));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        commands
    }

    fn walked_away(&self, biscuit: BiscuitId, clock: Duration) -> bool {
        self.contested_at
            .get(&biscuit)
            .is_some_and(|since| clock.saturating_sub(*since) >= WALK_AWAY)
    }
}

fn is_contested(snapshot: &BiscuitSnapshot) -> bool {
    snapshot.state == BiscuitState::Contested
}

fn release(biscuit: BiscuitId, enemy: EnemyId) -> Command {
    Command::ReleaseBiscuit { biscuit, enemy }
}

/// Backend that reports presentation calls as trace records.
#[derive(Debug)]
struct TraceBackend;

impl PresentationBackend for TraceBackend {
    fn set_biscuit_active(&mut self, biscuit: BiscuitId, active: bool) -> Result<()> {
        trace!(biscuit = biscuit.get(), active, "biscuit visibility");
        Ok(())
    }

    fn set_biscuit_animation_rate(&mut self, biscuit: BiscuitId, rate: f32) -> Result<()> {
        trace!(biscuit = biscuit.get(), rate, "biscuit animation rate");
        Ok(())
    }

    fn set_biscuit_pose(&mut self, biscuit: BiscuitId, resting: Vec2, pose: BobPose) -> Result<()> {
        let placed = resting + pose.offset;
        trace!(
            biscuit = biscuit.get(),
            x = placed.x,
            y = placed.y,
            rotation = pose.rotation_degrees,
            scale = pose.scale,
            "biscuit pose"
        );
        Ok(())
    }

    fn set_contest_progress(&mut self, biscuit: BiscuitId, progress: Option<f32>) -> Result<()> {
        trace!(biscuit = biscuit.get(), ?progress, "contest progress");
        Ok(())
    }

    fn set_beam_endpoints(&mut self, enemy: EnemyId, start: Vec2, end: Vec2) -> Result<()> {
        trace!(enemy = enemy.get(), ?start, ?end, "beam endpoints");
        Ok(())
    }

    fn set_beam_enabled(&mut self, enemy: EnemyId, enabled: bool) -> Result<()> {
        trace!(enemy = enemy.get(), enabled, "beam enabled");
        Ok(())
    }

    fn set_enemy_alpha(&mut self, enemy: EnemyId, alpha: f32) -> Result<()> {
        trace!(enemy = enemy.get(), alpha, "enemy alpha");
        Ok(())
    }

    fn set_enemy_active(&mut self, enemy: EnemyId, active: bool) -> Result<()> {
        trace!(enemy = enemy.get(), active, "enemy visibility");
        Ok(())
    }
}
