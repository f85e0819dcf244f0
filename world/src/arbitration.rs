//! Cross-entity calls that keep biscuit claimants and enemy targets symmetric.
//!
//! Every operation resolves both handles against the live registries before
//! touching either side, and finishes both sides of a transition before
//! returning, so no caller can observe a half-updated pair.

use std::time::Duration;

use biscuit_battle_core::{
    BiscuitId, ClaimError, EnemyId, EnemyState, Event, POINTS_PER_WIN, PROGRESS_BPS_MAX,
};
use tracing::{debug, warn};

use crate::{biscuits::PressOutcome, enemies::EnemyStep, World};

impl World {
    pub(crate) fn begin_claim(&mut self, enemy: EnemyId, biscuit: BiscuitId, out: &mut Vec<Event>) {
        let Some(hunter) = self.enemies.get(enemy) else {
            reject_claim(enemy, biscuit, ClaimError::MissingEnemy, out);
            return;
        };
        if hunter.state() != EnemyState::Searching {
            reject_claim(enemy, biscuit, ClaimError::EnemyNotSearching, out);
            return;
        }
        let Some(prize) = self.biscuits.get_mut(biscuit) else {
            reject_claim(enemy, biscuit, ClaimError::MissingBiscuit, out);
            return;
        };
        if let Err(reason) = prize.begin_claim(enemy) {
            reject_claim(enemy, biscuit, reason, out);
            return;
        }
        if let Some(hunter) = self.enemies.get_mut(enemy) {
            hunter.begin_claiming(biscuit);
        }

        debug!(enemy = enemy.get(), biscuit = biscuit.get(), "claim started");
        out.push(Event::ClaimStarted { enemy, biscuit });
    }

    pub(crate) fn defer_search(&mut self, enemy: EnemyId, out: &mut Vec<Event>) {
        let cooldown = self.tuning.retarget_delay;
        let Some(hunter) = self.enemies.get_mut(enemy) else {
            return;
        };
        if hunter.defer_search(cooldown) {
            out.push(Event::SearchDeferred { enemy, cooldown });
        }
    }

    pub(crate) fn press(&mut self, biscuit: BiscuitId, out: &mut Vec<Event>) {
        let now = self.clock;
        let Some(prize) = self.biscuits.get_mut(biscuit) else {
            return;
        };

        let PressOutcome::Contested(claimant) = prize.press(now) else {
            return;
        };

        let Some(hunter) = self.enemies.get_mut(claimant) else {
            warn!(
                enemy = claimant.get(),
                biscuit = biscuit.get(),
                "contested biscuit had a dangling claimant; resetting to idle"
            );
            let _ = prize.release_if_claimant(claimant);
            return;
        };
        if !hunter.notify_contested(biscuit) {
            debug!(
                enemy = claimant.get(),
                biscuit = biscuit.get(),
                "claimant ignored contest notification"
            );
        }

        debug!(enemy = claimant.get(), biscuit = biscuit.get(), "claim contested");
        out.push(Event::ClaimContested {
            enemy: claimant,
            biscuit,
        });
    }

    /// Advances every contest and returns the enemies stunned by a win this tick.
    pub(crate) fn resolve_contests(
        &mut self,
        dt: Duration,
        out: &mut Vec<Event>,
    ) -> Vec<EnemyId> {
        let now = self.clock;
        let mut stunned = Vec::new();
        for biscuit in self.biscuits.contested() {
            let Some(prize) = self.biscuits.get_mut(biscuit) else {
                continue;
            };
            let Some(step) = prize.advance_contest(now, dt, &self.tuning) else {
                continue;
            };
            let claimant = prize.claimant();

            out.push(Event::ContestProgressed {
                biscuit,
                progress_bps: progress_to_bps(step.progress),
            });

            if step.won {
                stunned.extend(self.player_won(biscuit, claimant, out));
            }
        }
        stunned
    }

    fn player_won(
        &mut self,
        biscuit: BiscuitId,
        claimant: Option<EnemyId>,
        out: &mut Vec<Event>,
    ) -> Option<EnemyId> {
        let _ = self.biscuits.remove(biscuit);

        let stunned = claimant.filter(|enemy| {
            self.enemies
                .get_mut(*enemy)
                .map_or(false, |hunter| {
                    hunter.target() == Some(biscuit) && hunter.on_player_won()
                })
        });

        debug!(
            biscuit = biscuit.get(),
            enemy = stunned.map(|enemy| enemy.get()),
            "player won contest"
        );
        out.push(Event::PlayerWon {
            biscuit,
            enemy: stunned,
            points: POINTS_PER_WIN,
        });
        if let Some(enemy) = stunned {
            out.push(Event::EnemyStunned { enemy });
        }
        stunned
    }

    /// Runs enemy timers; enemies in `just_stunned` start their stun next tick.
    pub(crate) fn advance_enemies(
        &mut self,
        dt: Duration,
        just_stunned: &[EnemyId],
        out: &mut Vec<Event>,
    ) {
        for enemy in self.enemies.ids() {
            if just_stunned.contains(&enemy) {
                continue;
            }
            let Some(hunter) = self.enemies.get_mut(enemy) else {
                continue;
            };
            match hunter.advance(dt, &self.tuning) {
                EnemyStep::Unchanged => {}
                EnemyStep::ClaimExpired(biscuit) => self.consume(enemy, biscuit, out),
                EnemyStep::FadeStarted => out.push(Event::EnemyFadeStarted { enemy }),
                EnemyStep::FadeCompleted => {
                    let _ = self.enemies.remove(enemy);
                    debug!(enemy = enemy.get(), "enemy despawned");
                    out.push(Event::EnemyDespawned { enemy });
                }
            }
        }
    }

    fn consume(&mut self, enemy: EnemyId, biscuit: BiscuitId, out: &mut Vec<Event>) {
        let held = self
            .biscuits
            .get(biscuit)
            .map_or(false, |prize| prize.claimant() == Some(enemy));
        if !held {
            warn!(
                enemy = enemy.get(),
                biscuit = biscuit.get(),
                "claim expired on a biscuit the enemy no longer holds"
            );
            return;
        }

        let _ = self.biscuits.remove(biscuit);
        debug!(enemy = enemy.get(), biscuit = biscuit.get(), "biscuit consumed");
        out.push(Event::BiscuitConsumed { enemy, biscuit });
    }

    pub(crate) fn release_if_claimant(
        &mut self,
        biscuit: BiscuitId,
        enemy: EnemyId,
        out: &mut Vec<Event>,
    ) {
        let Some(prize) = self.biscuits.get_mut(biscuit) else {
            return;
        };
        if !prize.release_if_claimant(enemy) {
            return;
        }
        if let Some(hunter) = self.enemies.get_mut(enemy) {
            let _ = hunter.on_target_released(biscuit);
        }

        debug!(enemy = enemy.get(), biscuit = biscuit.get(), "claim released");
        out.push(Event::ClaimReleased { enemy, biscuit });
    }

    pub(crate) fn destroy_biscuit(&mut self, biscuit: BiscuitId, out: &mut Vec<Event>) {
        let Some(prize) = self.biscuits.remove(biscuit) else {
            return;
        };

        if let Some(claimant) = prize.claimant() {
            let released = self
                .enemies
                .get_mut(claimant)
                .map_or(false, |hunter| hunter.on_target_released(biscuit));
            if released {
                out.push(Event::ClaimReleased {
                    enemy: claimant,
                    biscuit,
                });
            }
        }

        debug!(biscuit = biscuit.get(), "biscuit removed");
        out.push(Event::BiscuitRemoved { biscuit });
    }

    pub(crate) fn remove_enemy(&mut self, enemy: EnemyId, out: &mut Vec<Event>) {
        let Some(target) = self.enemies.get(enemy).map(|hunter| hunter.target()) else {
            return;
        };
        if let Some(biscuit) = target {
            self.release_if_claimant(biscuit, enemy, out);
        }

        let _ = self.enemies.remove(enemy);
        debug!(enemy = enemy.get(), "enemy removed");
        out.push(Event::EnemyRemoved { enemy });
    }
}

fn reject_claim(enemy: EnemyId, biscuit: BiscuitId, reason: ClaimError, out: &mut Vec<Event>) {
    debug!(
        enemy = enemy.get(),
        biscuit = biscuit.get(),
        ?reason,
        "claim rejected"
    );
    out.push(Event::ClaimRejected {
        enemy,
        biscuit,
        reason,
    });
}

fn progress_to_bps(progress: f32) -> u32 {
    let scaled = (progress.clamp(0.0, 1.0) * PROGRESS_BPS_MAX as f32).round();
    (scaled as u32).min(PROGRESS_BPS_MAX)
}
