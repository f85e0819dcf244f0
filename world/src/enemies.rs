//! Authoritative enemy state and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use biscuit_battle_core::{
    ArbitrationTuning, BiscuitId, EnemyId, EnemySnapshot, EnemyState, Position,
};

/// Enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    /// Identifier allocated by the world for the enemy.
    pub(crate) id: EnemyId,
    /// Location of the enemy.
    pub(crate) position: Position,
    phase: EnemyPhase,
}

#[derive(Clone, Debug)]
enum EnemyPhase {
    Searching {
        cooldown: Duration,
    },
    Claiming {
        target: BiscuitId,
        elapsed: Duration,
    },
    WaitingResolution {
        target: BiscuitId,
        frozen_elapsed: Duration,
    },
    Stunned {
        elapsed: Duration,
        fade: Option<Duration>,
    },
}

/// Timer outcome of advancing an enemy by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyStep {
    /// Nothing crossed a threshold.
    Unchanged,
    /// The uncontested countdown completed; the enemy already dropped this target.
    ClaimExpired(BiscuitId),
    /// The stun ran out and the despawn fade began.
    FadeStarted,
    /// The fade completed and the enemy should leave the world.
    FadeCompleted,
}

impl Enemy {
    fn new(id: EnemyId, position: Position) -> Self {
        Self {
            id,
            position,
            phase: EnemyPhase::Searching {
                cooldown: Duration::ZERO,
            },
        }
    }

    pub(crate) fn state(&self) -> EnemyState {
        match self.phase {
            EnemyPhase::Searching { .. } => EnemyState::Searching,
            EnemyPhase::Claiming { .. } => EnemyState::Claiming,
            EnemyPhase::WaitingResolution { .. } => EnemyState::WaitingResolution,
            EnemyPhase::Stunned { .. } => EnemyState::Stunned,
        }
    }

    pub(crate) fn target(&self) -> Option<BiscuitId> {
        match self.phase {
            EnemyPhase::Claiming { target, .. } | EnemyPhase::WaitingResolution { target, .. } => {
                Some(target)
            }
            EnemyPhase::Searching { .. } | EnemyPhase::Stunned { .. } => None,
        }
    }

    /// Starts a fresh countdown on `biscuit`. Callers verify the enemy is searching.
    pub(crate) fn begin_claiming(&mut self, biscuit: BiscuitId) {
        debug_assert_eq!(self.state(), EnemyState::Searching);
        self.phase = EnemyPhase::Claiming {
            target: biscuit,
            elapsed: Duration::ZERO,
        };
    }

    /// Puts a searching enemy on cooldown; reports whether it was searching.
    pub(crate) fn defer_search(&mut self, cooldown: Duration) -> bool {
        let EnemyPhase::Searching { cooldown: current } = &mut self.phase else {
            return false;
        };
        *current = cooldown;
        true
    }

    /// Abandons the countdown when `biscuit` is the claimed target.
    pub(crate) fn notify_contested(&mut self, biscuit: BiscuitId) -> bool {
        match self.phase {
            EnemyPhase::Claiming { target, elapsed } if target == biscuit => {
                self.phase = EnemyPhase::WaitingResolution {
                    target,
                    frozen_elapsed: elapsed,
                };
                true
            }
            _ => false,
        }
    }

    /// Enters the terminal stun. Reports whether the enemy was not already stunned.
    pub(crate) fn on_player_won(&mut self) -> bool {
        if matches!(self.phase, EnemyPhase::Stunned { .. }) {
            return false;
        }
        self.phase = EnemyPhase::Stunned {
            elapsed: Duration::ZERO,
            fade: None,
        };
        true
    }

    /// Drops `biscuit` without a contest result and resumes searching.
    pub(crate) fn on_target_released(&mut self, biscuit: BiscuitId) -> bool {
        if self.target() != Some(biscuit) {
            return false;
        }
        self.phase = EnemyPhase::Searching {
            cooldown: Duration::ZERO,
        };
        true
    }

    pub(crate) fn advance(&mut self, dt: Duration, tuning: &ArbitrationTuning) -> EnemyStep {
        match &mut self.phase {
            EnemyPhase::Searching { cooldown } => {
                *cooldown = cooldown.saturating_sub(dt);
                EnemyStep::Unchanged
            }
            EnemyPhase::Claiming { target, elapsed } => {
                *elapsed = elapsed.saturating_add(dt);
                if *elapsed < tuning.claim_duration {
                    return EnemyStep::Unchanged;
                }
                let consumed = *target;
                self.phase = EnemyPhase::Searching {
                    cooldown: Duration::ZERO,
                };
                EnemyStep::ClaimExpired(consumed)
            }
            EnemyPhase::WaitingResolution { .. } => EnemyStep::Unchanged,
            EnemyPhase::Stunned { elapsed, fade } => {
                if let Some(faded) = fade.as_mut() {
                    *faded = faded.saturating_add(dt);
                    return if *faded >= tuning.fade_duration {
                        EnemyStep::FadeCompleted
                    } else {
                        EnemyStep::Unchanged
                    };
                }

                *elapsed = elapsed.saturating_add(dt);
                if *elapsed < tuning.stun_duration {
                    return EnemyStep::Unchanged;
                }
                *fade = Some(Duration::ZERO);
                EnemyStep::FadeStarted
            }
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        let mut snapshot = EnemySnapshot {
            id: self.id,
            position: self.position,
            state: self.state(),
            target: self.target(),
            claim_elapsed: Duration::ZERO,
            stun_elapsed: Duration::ZERO,
            fade_elapsed: None,
            retarget_cooldown: Duration::ZERO,
        };

        match self.phase {
            EnemyPhase::Searching { cooldown } => snapshot.retarget_cooldown = cooldown,
            EnemyPhase::Claiming { elapsed, .. } => snapshot.claim_elapsed = elapsed,
            EnemyPhase::WaitingResolution { frozen_elapsed, .. } => {
                snapshot.claim_elapsed = frozen_elapsed;
            }
            EnemyPhase::Stunned { elapsed, fade } => {
                snapshot.stun_elapsed = elapsed;
                snapshot.fade_elapsed = fade;
            }
        }

        snapshot
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    /// Creates an empty enemy registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Stores a new searching enemy and returns its identifier.
    pub(crate) fn spawn(&mut self, position: Position) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Enemy::new(id, position));
        id
    }

    pub(crate) fn get(&self, enemy: EnemyId) -> Option<&Enemy> {
        self.entries.get(&enemy)
    }

    pub(crate) fn get_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&enemy)
    }

    pub(crate) fn remove(&mut self, enemy: EnemyId) -> Option<Enemy> {
        self.entries.remove(&enemy)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    /// Identifiers of every enemy in ascending order.
    pub(crate) fn ids(&self) -> Vec<EnemyId> {
        self.entries.keys().copied().collect()
    }
}
