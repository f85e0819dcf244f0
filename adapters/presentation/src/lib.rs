#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts for Biscuit Battle adapters.
//!
//! The [`Presenter`] turns world events and snapshots into calls on a
//! [`PresentationBackend`]. Backends only draw; they never feed state back
//! into the simulation.

mod motion;

use std::{collections::BTreeMap, time::Duration};

use anyhow::Result as AnyResult;
use biscuit_battle_core::{
    BiscuitId, BiscuitView, EnemyId, EnemyState, EnemyView, Event, Position, PROGRESS_BPS_MAX,
};
use glam::Vec2;

pub use motion::{
    stunned_alpha, BiscuitBob, BobPose, BOB_AMPLITUDE, BOB_CYCLES_PER_SECOND, SCALE_PULSE,
    SPIN_DEGREES_PER_SECOND, STUNNED_ALPHA,
};

/// Converts a simulation position into presentation space.
#[must_use]
pub fn to_vec2(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

/// Drawing surface capable of presenting Biscuit Battle entities.
pub trait PresentationBackend {
    /// Shows or hides the biscuit's passive animation.
    fn set_biscuit_active(&mut self, biscuit: BiscuitId, active: bool) -> AnyResult<()>;

    /// Scales the biscuit's passive animation; `0.0` freezes it.
    fn set_biscuit_animation_rate(&mut self, biscuit: BiscuitId, rate: f32) -> AnyResult<()>;

    /// Places the biscuit sprite at `resting` transformed by `pose`.
    fn set_biscuit_pose(&mut self, biscuit: BiscuitId, resting: Vec2, pose: BobPose)
        -> AnyResult<()>;

    /// Shows the contest progress bar above a biscuit, or hides it with `None`.
    fn set_contest_progress(&mut self, biscuit: BiscuitId, progress: Option<f32>)
        -> AnyResult<()>;

    /// Updates the endpoints of an enemy's targeting beam.
    fn set_beam_endpoints(&mut self, enemy: EnemyId, start: Vec2, end: Vec2) -> AnyResult<()>;

    /// Enables or disables an enemy's targeting beam.
    fn set_beam_enabled(&mut self, enemy: EnemyId, enabled: bool) -> AnyResult<()>;

    /// Sets the opacity of an enemy sprite.
    fn set_enemy_alpha(&mut self, enemy: EnemyId, alpha: f32) -> AnyResult<()>;

    /// Shows an enemy sprite, or hides it once the enemy leaves the world.
    fn set_enemy_active(&mut self, enemy: EnemyId, active: bool) -> AnyResult<()>;
}

/// Routes world events and snapshots to a presentation backend.
#[derive(Debug, Default)]
pub struct Presenter {
    bobs: BTreeMap<BiscuitId, BiscuitBob>,
}

impl Presenter {
    /// Creates a presenter with no tracked biscuits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Animation state of a tracked biscuit.
    #[must_use]
    pub fn bob(&self, biscuit: BiscuitId) -> Option<&BiscuitBob> {
        self.bobs.get(&biscuit)
    }

    /// Applies a batch of world events, then refreshes time-driven visuals.
    pub fn handle<B>(
        &mut self,
        events: &[Event],
        biscuits: &BiscuitView,
        enemies: &EnemyView,
        fade_duration: Duration,
        backend: &mut B,
    ) -> AnyResult<()>
    where
        B: PresentationBackend,
    {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match *event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(dt),
                Event::BiscuitSpawned { biscuit, .. } => {
                    let _ = self.bobs.insert(biscuit, BiscuitBob::for_biscuit(biscuit));
                    backend.set_biscuit_active(biscuit, true)?;
                    self.set_rate(biscuit, 1.0, backend)?;
                }
                Event::ClaimStarted { enemy, biscuit } => {
                    self.set_rate(biscuit, 0.0, backend)?;
                    backend.set_beam_enabled(enemy, true)?;
                }
                Event::ClaimContested { biscuit, .. } => {
                    backend.set_contest_progress(biscuit, Some(0.0))?;
                }
                Event::ContestProgressed {
                    biscuit,
                    progress_bps,
                } => {
                    let progress = progress_bps as f32 / PROGRESS_BPS_MAX as f32;
                    backend.set_contest_progress(biscuit, Some(progress))?;
                }
                Event::ClaimReleased { enemy, biscuit } => {
                    backend.set_beam_enabled(enemy, false)?;
                    backend.set_contest_progress(biscuit, None)?;
                    self.set_rate(biscuit, 1.0, backend)?;
                }
                Event::BiscuitConsumed { enemy, biscuit } => {
                    backend.set_beam_enabled(enemy, false)?;
                    self.retire_biscuit(biscuit, backend)?;
                }
                Event::PlayerWon { biscuit, .. } | Event::BiscuitRemoved { biscuit } => {
                    self.retire_biscuit(biscuit, backend)?;
                }
                Event::EnemyStunned { enemy } => {
                    backend.set_beam_enabled(enemy, false)?;
                    backend.set_enemy_alpha(enemy, STUNNED_ALPHA)?;
                }
                Event::EnemySpawned { enemy, .. } => {
                    backend.set_enemy_active(enemy, true)?;
                    backend.set_enemy_alpha(enemy, 1.0)?;
                }
                Event::EnemyDespawned { enemy } | Event::EnemyRemoved { enemy } => {
                    backend.set_beam_enabled(enemy, false)?;
                    backend.set_enemy_active(enemy, false)?;
                }
                _ => {}
            }
        }

        if elapsed.is_zero() {
            return Ok(());
        }
        self.animate(elapsed, biscuits, enemies, fade_duration, backend)
    }

    fn set_rate<B>(&mut self, biscuit: BiscuitId, rate: f32, backend: &mut B) -> AnyResult<()>
    where
        B: PresentationBackend,
    {
        if let Some(bob) = self.bobs.get_mut(&biscuit) {
            bob.set_rate(rate);
        }
        backend.set_biscuit_animation_rate(biscuit, rate)
    }

    fn retire_biscuit<B>(&mut self, biscuit: BiscuitId, backend: &mut B) -> AnyResult<()>
    where
        B: PresentationBackend,
    {
        let _ = self.bobs.remove(&biscuit);
        backend.set_contest_progress(biscuit, None)?;
        backend.set_biscuit_active(biscuit, false)
    }

    fn animate<B>(
        &mut self,
        dt: Duration,
        biscuits: &BiscuitView,
        enemies: &EnemyView,
        fade_duration: Duration,
        backend: &mut B,
    ) -> AnyResult<()>
    where
        B: PresentationBackend,
    {
        for snapshot in biscuits.iter() {
            if let Some(bob) = self.bobs.get_mut(&snapshot.id) {
                let pose = bob.advance(dt);
                backend.set_biscuit_pose(snapshot.id, to_vec2(snapshot.position), pose)?;
            }
        }

        for snapshot in enemies.iter() {
            match snapshot.state {
                EnemyState::Claiming | EnemyState::WaitingResolution => {
                    let Some(target) = snapshot.target.and_then(|biscuit| biscuits.get(biscuit))
                    else {
                        continue;
                    };
                    backend.set_beam_endpoints(
                        snapshot.id,
                        to_vec2(snapshot.position),
                        to_vec2(target.position),
                    )?;
                }
                EnemyState::Stunned => {
                    let alpha = stunned_alpha(snapshot.fade_elapsed, fade_duration);
                    backend.set_enemy_alpha(snapshot.id, alpha)?;
                }
                EnemyState::Searching => {}
            }
        }

        Ok(())
    }
}
