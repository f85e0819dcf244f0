//! Authoritative biscuit state and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use biscuit_battle_core::{
    ArbitrationTuning, BiscuitId, BiscuitSnapshot, BiscuitState, ClaimError, EnemyId, Position,
};

use crate::click_rate::{contest_progress, ClickRateTracker};

/// Biscuit stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Biscuit {
    /// Identifier allocated by the world for the biscuit.
    pub(crate) id: BiscuitId,
    /// Location of the biscuit.
    pub(crate) position: Position,
    phase: BiscuitPhase,
}

/// The claimant lives inside the variants so an idle biscuit can never hold one.
#[derive(Clone, Debug)]
enum BiscuitPhase {
    Idle,
    Claimed {
        claimant: EnemyId,
    },
    Contested {
        claimant: EnemyId,
        clicks: ClickRateTracker,
        continuous_success: Duration,
    },
}

/// Result of a primary-action press on a biscuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PressOutcome {
    /// The biscuit was idle, so the press has no arbitration effect.
    Ignored,
    /// The press turned a claim into a contest against this claimant.
    Contested(EnemyId),
    /// The press was counted toward an ongoing contest.
    Counted,
}

/// Result of resolving a contested biscuit for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ContestStep {
    /// Progress toward a win in `0.0..=1.0`.
    pub(crate) progress: f32,
    /// Whether the player has now held full progress long enough.
    pub(crate) won: bool,
}

impl Biscuit {
    fn new(id: BiscuitId, position: Position) -> Self {
        Self {
            id,
            position,
            phase: BiscuitPhase::Idle,
        }
    }

    pub(crate) fn state(&self) -> BiscuitState {
        match self.phase {
            BiscuitPhase::Idle => BiscuitState::Idle,
            BiscuitPhase::Claimed { .. } => BiscuitState::Claimed,
            BiscuitPhase::Contested { .. } => BiscuitState::Contested,
        }
    }

    pub(crate) fn claimant(&self) -> Option<EnemyId> {
        match self.phase {
            BiscuitPhase::Idle => None,
            BiscuitPhase::Claimed { claimant } | BiscuitPhase::Contested { claimant, .. } => {
                Some(claimant)
            }
        }
    }

    /// Idle → Claimed. Any other state keeps its current claimant.
    pub(crate) fn begin_claim(&mut self, enemy: EnemyId) -> Result<(), ClaimError> {
        if !matches!(self.phase, BiscuitPhase::Idle) {
            return Err(ClaimError::BiscuitNotIdle);
        }
        self.phase = BiscuitPhase::Claimed { claimant: enemy };
        Ok(())
    }

    pub(crate) fn press(&mut self, now: Duration) -> PressOutcome {
        match &mut self.phase {
            BiscuitPhase::Idle => PressOutcome::Ignored,
            BiscuitPhase::Claimed { claimant } => {
                let claimant = *claimant;
                self.phase = BiscuitPhase::Contested {
                    claimant,
                    clicks: ClickRateTracker::new(),
                    continuous_success: Duration::ZERO,
                };
                PressOutcome::Contested(claimant)
            }
            BiscuitPhase::Contested { clicks, .. } => {
                clicks.record_event(now);
                PressOutcome::Counted
            }
        }
    }

    /// Prunes the click window and updates the hold timer. `None` unless contested.
    pub(crate) fn advance_contest(
        &mut self,
        now: Duration,
        dt: Duration,
        tuning: &ArbitrationTuning,
    ) -> Option<ContestStep> {
        let BiscuitPhase::Contested {
            clicks,
            continuous_success,
            ..
        } = &mut self.phase
        else {
            return None;
        };

        clicks.prune(now);
        let progress = contest_progress(clicks.rate(), tuning.rate_per_second_for_max);
        let maxed = progress >= 1.0;
        if maxed {
            *continuous_success = continuous_success.saturating_add(dt);
        } else {
            *continuous_success = Duration::ZERO;
        }

        Some(ContestStep {
            progress,
            won: maxed && *continuous_success >= tuning.win_hold_duration,
        })
    }

    /// Returns to idle when `enemy` holds the claim; reports whether it did.
    pub(crate) fn release_if_claimant(&mut self, enemy: EnemyId) -> bool {
        if self.claimant() != Some(enemy) {
            return false;
        }
        self.phase = BiscuitPhase::Idle;
        true
    }

    pub(crate) fn snapshot(&self) -> BiscuitSnapshot {
        let (click_rate, continuous_success) = match &self.phase {
            BiscuitPhase::Contested {
                clicks,
                continuous_success,
                ..
            } => (clicks.rate(), *continuous_success),
            _ => (0, Duration::ZERO),
        };

        BiscuitSnapshot {
            id: self.id,
            position: self.position,
            state: self.state(),
            claimant: self.claimant(),
            click_rate,
            continuous_success,
        }
    }
}

/// Registry that stores biscuits and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct BiscuitRegistry {
    entries: BTreeMap<BiscuitId, Biscuit>,
    next_biscuit_id: BiscuitId,
}

impl BiscuitRegistry {
    /// Creates an empty biscuit registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_biscuit_id: BiscuitId::new(0),
        }
    }

    /// Stores a new idle biscuit and returns its identifier.
    pub(crate) fn spawn(&mut self, position: Position) -> BiscuitId {
        let id = self.next_biscuit_id;
        self.next_biscuit_id = BiscuitId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Biscuit::new(id, position));
        id
    }

    pub(crate) fn get(&self, biscuit: BiscuitId) -> Option<&Biscuit> {
        self.entries.get(&biscuit)
    }

    pub(crate) fn get_mut(&mut self, biscuit: BiscuitId) -> Option<&mut Biscuit> {
        self.entries.get_mut(&biscuit)
    }

    pub(crate) fn remove(&mut self, biscuit: BiscuitId) -> Option<Biscuit> {
        self.entries.remove(&biscuit)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Biscuit> {
        self.entries.values()
    }

    /// Identifiers of every contested biscuit in ascending order.
    pub(crate) fn contested(&self) -> Vec<BiscuitId> {
        self.entries
            .values()
            .filter(|biscuit| biscuit.state() == BiscuitState::Contested)
            .map(|biscuit| biscuit.id)
            .collect()
    }
}
