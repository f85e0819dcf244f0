#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that plans claims for searching enemies from world snapshots.
//!
//! The system never reserves biscuits between enemies. When two enemies pick
//! the same biscuit in one pass the world accepts the first claim and rejects
//! the second, which simply searches again on the next pass.

use biscuit_battle_core::{
    BiscuitId, BiscuitState, BiscuitView, Command, EnemyId, EnemyView, Event, Position,
};

/// Returns the idle biscuit closest to `origin`.
///
/// Distances compare squared; on equal distance the lower identifier wins
/// because the view iterates in identifier order.
#[must_use]
pub fn select_nearest_idle(origin: Position, biscuits: &BiscuitView) -> Option<BiscuitId> {
    let mut best: Option<(f32, BiscuitId)> = None;

    for snapshot in biscuits.iter() {
        if snapshot.state != BiscuitState::Idle {
            continue;
        }

        let distance_sq = origin.distance_squared(snapshot.position);
        match best {
            Some((closest, _)) if distance_sq >= closest => {}
            _ => best = Some((distance_sq, snapshot.id)),
        }
    }

    best.map(|(_, biscuit)| biscuit)
}

/// Targeting system that reuses a scratch buffer to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct Targeting {
    ready: Vec<Hunter>,
    rotation: usize,
}

impl Targeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a claim or a deferral for every enemy ready to search.
    ///
    /// Planning only happens on passes that observed time advancing. The
    /// order in which ready enemies are planned rotates every pass.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        biscuits: &BiscuitView,
        out: &mut Vec<Command>,
    ) {
        let advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !advanced {
            return;
        }

        self.prepare_ready(enemies);
        if self.ready.is_empty() {
            return;
        }

        let start = self.rotation % self.ready.len();
        self.rotation = self.rotation.wrapping_add(1);

        let (tail, head) = self.ready.split_at(start);
        for hunter in head.iter().chain(tail) {
            match select_nearest_idle(hunter.position, biscuits) {
                Some(biscuit) => out.push(Command::ClaimBiscuit {
                    enemy: hunter.id,
                    biscuit,
                }),
                None => out.push(Command::DeferSearch { enemy: hunter.id }),
            }
        }
    }

    fn prepare_ready(&mut self, enemies: &EnemyView) {
        self.ready.clear();
        self.ready.extend(
            enemies
                .iter()
                .filter(|snapshot| snapshot.ready_to_search())
                .map(|snapshot| Hunter {
                    id: snapshot.id,
                    position: snapshot.position,
                }),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Hunter {
    id: EnemyId,
    position: Position,
}

#[cfg(test)]
mod tests {
    use super::{select_nearest_idle, Targeting};
    use biscuit_battle_core::{
        BiscuitId, BiscuitSnapshot, BiscuitState, BiscuitView, Command, EnemyId, EnemySnapshot,
        EnemyState, EnemyView, Event, Position,
    };
    use std::time::Duration;

    fn biscuit(id: u32, x: f32, y: f32, state: BiscuitState) -> BiscuitSnapshot {
        BiscuitSnapshot {
            id: BiscuitId::new(id),
            position: Position::new(x, y),
            state,
            claimant: (state != BiscuitState::Idle).then(|| EnemyId::new(99)),
            click_rate: 0,
            continuous_success: Duration::ZERO,
        }
    }

    fn enemy(id: u32, x: f32, y: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position: Position::new(x, y),
            state: EnemyState::Searching,
            target: None,
            claim_elapsed: Duration::ZERO,
            stun_elapsed: Duration::ZERO,
            fade_elapsed: None,
            retarget_cooldown: Duration::ZERO,
        }
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16),
        }]
    }

    #[test]
    fn nearest_idle_biscuit_is_selected() {
        let biscuits = BiscuitView::from_snapshots(vec![
            biscuit(1, 10.0, 0.0, BiscuitState::Idle),
            biscuit(2, 3.0, 4.0, BiscuitState::Idle),
            biscuit(3, 1.0, 0.0, BiscuitState::Claimed),
        ]);

        assert_eq!(
            select_nearest_idle(Position::new(0.0, 0.0), &biscuits),
            Some(BiscuitId::new(2))
        );
    }

    #[test]
    fn equal_distances_prefer_lower_identifier() {
        let biscuits = BiscuitView::from_snapshots(vec![
            biscuit(7, -2.0, 0.0, BiscuitState::Idle),
            biscuit(4, 2.0, 0.0, BiscuitState::Idle),
        ]);

        assert_eq!(
            select_nearest_idle(Position::new(0.0, 0.0), &biscuits),
            Some(BiscuitId::new(4))
        );
    }

    #[test]
    fn no_idle_biscuit_yields_none() {
        let biscuits = BiscuitView::from_snapshots(vec![
            biscuit(1, 0.0, 0.0, BiscuitState::Claimed),
            biscuit(2, 1.0, 0.0, BiscuitState::Contested),
        ]);
        assert_eq!(select_nearest_idle(Position::default(), &biscuits), None);
        assert_eq!(
            select_nearest_idle(Position::default(), &BiscuitView::default()),
            None
        );
    }

    #[test]
    fn passes_without_time_are_ignored() {
        let mut system = Targeting::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 0.0, 0.0)]);
        let biscuits = BiscuitView::from_snapshots(vec![biscuit(1, 0.0, 0.0, BiscuitState::Idle)]);

        let mut out = Vec::new();
        system.handle(&[], &enemies, &biscuits, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn enemies_on_cooldown_or_busy_are_skipped() {
        let mut system = Targeting::new();
        let mut cooling = enemy(1, 0.0, 0.0);
        cooling.retarget_cooldown = Duration::from_millis(200);
        let mut busy = enemy(2, 0.0, 0.0);
        busy.state = EnemyState::Claiming;
        busy.target = Some(BiscuitId::new(5));
        let enemies = EnemyView::from_snapshots(vec![cooling, busy, enemy(3, 0.0, 0.0)]);
        let biscuits = BiscuitView::from_snapshots(vec![biscuit(1, 0.0, 0.0, BiscuitState::Idle)]);

        let mut out = Vec::new();
        system.handle(&tick(), &enemies, &biscuits, &mut out);

        assert_eq!(
            out,
            vec![Command::ClaimBiscuit {
                enemy: EnemyId::new(3),
                biscuit: BiscuitId::new(1),
            }]
        );
    }

    #[test]
    fn empty_field_defers_search() {
        let mut system = Targeting::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 0.0, 0.0)]);

        let mut out = Vec::new();
        system.handle(&tick(), &enemies, &BiscuitView::default(), &mut out);

        assert_eq!(
            out,
            vec![Command::DeferSearch {
                enemy: EnemyId::new(1)
            }]
        );
    }

    #[test]
    fn planning_order_rotates_between_passes() {
        let mut system = Targeting::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 0.0, 0.0), enemy(2, 1.0, 0.0)]);
        let biscuits = BiscuitView::from_snapshots(vec![biscuit(1, 0.5, 0.0, BiscuitState::Idle)]);

        let mut first = Vec::new();
        system.handle(&tick(), &enemies, &biscuits, &mut first);
        let mut second = Vec::new();
        system.handle(&tick(), &enemies, &biscuits, &mut second);

        let leader = |commands: &[Command]| match commands.first() {
            Some(Command::ClaimBiscuit { enemy, .. }) => *enemy,
            other => panic!("unexpected command: {other:?}"),
        };
        assert_eq!(leader(&first), EnemyId::new(1));
        assert_eq!(leader(&second), EnemyId::new(2));
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
    }
}
