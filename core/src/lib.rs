#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Biscuit Battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Points awarded to the player for every contest they win.
pub const POINTS_PER_WIN: u32 = 1;

/// Upper bound of contest progress expressed in basis points.
pub const PROGRESS_BPS_MAX: u32 = 10_000;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the thresholds that drive claims, contests and stuns.
    ConfigureArbitration {
        /// Tuning applied from the next tick onwards.
        tuning: ArbitrationTuning,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Places a new idle biscuit at the provided position.
    SpawnBiscuit {
        /// World-space location of the biscuit.
        position: Position,
    },
    /// Introduces a new searching enemy at the provided position.
    SpawnEnemy {
        /// World-space location of the enemy.
        position: Position,
    },
    /// Requests that an enemy begin claiming a biscuit.
    ClaimBiscuit {
        /// Enemy issuing the claim.
        enemy: EnemyId,
        /// Biscuit the enemy wants to claim.
        biscuit: BiscuitId,
    },
    /// Reports that a searching enemy found no idle biscuit and should wait.
    DeferSearch {
        /// Enemy that failed to find a target.
        enemy: EnemyId,
    },
    /// Primary action pressed on a biscuit during this tick.
    PressBiscuit {
        /// Biscuit hit by the press.
        biscuit: BiscuitId,
    },
    /// Ends a claim on behalf of the enemy holding it.
    ReleaseBiscuit {
        /// Biscuit to release.
        biscuit: BiscuitId,
        /// Enemy disengaging from the biscuit.
        enemy: EnemyId,
    },
    /// Destroys a biscuit regardless of its state.
    RemoveBiscuit {
        /// Biscuit to destroy.
        biscuit: BiscuitId,
    },
    /// Destroys an enemy without completing its state machine.
    RemoveEnemy {
        /// Enemy to destroy.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that new arbitration thresholds are active.
    ArbitrationConfigured {
        /// Tuning that became active.
        tuning: ArbitrationTuning,
    },
    /// Confirms that a biscuit was created.
    BiscuitSpawned {
        /// Identifier assigned to the biscuit.
        biscuit: BiscuitId,
        /// Location of the biscuit.
        position: Position,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Location of the enemy.
        position: Position,
    },
    /// An enemy now holds an uncontested claim on a biscuit.
    ClaimStarted {
        /// Enemy holding the claim.
        enemy: EnemyId,
        /// Biscuit being claimed.
        biscuit: BiscuitId,
    },
    /// A claim request was refused.
    ClaimRejected {
        /// Enemy that issued the claim.
        enemy: EnemyId,
        /// Biscuit named in the claim.
        biscuit: BiscuitId,
        /// Specific reason the claim failed.
        reason: ClaimError,
    },
    /// A searching enemy entered its retarget cooldown.
    SearchDeferred {
        /// Enemy that is waiting.
        enemy: EnemyId,
        /// Time until the enemy searches again.
        cooldown: Duration,
    },
    /// The player interrupted a claim and a contest began.
    ClaimContested {
        /// Enemy whose claim was interrupted.
        enemy: EnemyId,
        /// Biscuit under contest.
        biscuit: BiscuitId,
    },
    /// Per-tick resolution progress of a contested biscuit.
    ContestProgressed {
        /// Biscuit under contest.
        biscuit: BiscuitId,
        /// Progress toward a win in basis points, `0..=PROGRESS_BPS_MAX`.
        progress_bps: u32,
    },
    /// An enemy's uncontested countdown expired and it took the biscuit.
    BiscuitConsumed {
        /// Enemy that consumed the biscuit.
        enemy: EnemyId,
        /// Biscuit that was destroyed.
        biscuit: BiscuitId,
    },
    /// The player held the contest at full rate long enough to win.
    PlayerWon {
        /// Biscuit that was won and destroyed.
        biscuit: BiscuitId,
        /// Claimant that lost the contest, if it was still alive.
        enemy: Option<EnemyId>,
        /// Points awarded for the win.
        points: u32,
    },
    /// An enemy lost a contest and became inert.
    EnemyStunned {
        /// Enemy that was stunned.
        enemy: EnemyId,
    },
    /// A stunned enemy finished its stun and started fading out.
    EnemyFadeStarted {
        /// Enemy that is fading.
        enemy: EnemyId,
    },
    /// A stunned enemy completed its fade and left the world.
    EnemyDespawned {
        /// Enemy that despawned.
        enemy: EnemyId,
    },
    /// A claim ended without a winner and both entities returned to neutral.
    ClaimReleased {
        /// Enemy that dropped its target.
        enemy: EnemyId,
        /// Biscuit that returned to idle, or was destroyed.
        biscuit: BiscuitId,
    },
    /// A biscuit was destroyed by an external request.
    BiscuitRemoved {
        /// Biscuit that was destroyed.
        biscuit: BiscuitId,
    },
    /// An enemy was destroyed by an external request.
    EnemyRemoved {
        /// Enemy that was destroyed.
        enemy: EnemyId,
    },
}

/// Reasons a claim request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimError {
    /// The biscuit already has a claimant.
    BiscuitNotIdle,
    /// No biscuit with the provided identifier exists.
    MissingBiscuit,
    /// No enemy with the provided identifier exists.
    MissingEnemy,
    /// The enemy is not in a state that may issue claims.
    EnemyNotSearching,
}

/// Unique identifier assigned to a biscuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BiscuitId(u32);

impl BiscuitId {
    /// Creates a new biscuit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Continuous world-space location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared straight-line distance to another position.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// State of a biscuit in the arbitration protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiscuitState {
    /// Unclaimed and available to enemies.
    Idle,
    /// Held by an enemy running its uncontested countdown.
    Claimed,
    /// The player is contesting the claim.
    Contested,
}

/// State of an enemy in the arbitration protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Looking for an idle biscuit.
    Searching,
    /// Running the uncontested countdown on a target.
    Claiming,
    /// Claim was contested; waiting for the player's result.
    WaitingResolution,
    /// Lost a contest; inert until despawned.
    Stunned,
}

/// Thresholds that govern claims, contests and stuns.
///
/// Durations are simulated time. `rate_per_second_for_max` is the click rate
/// that maps to full contest progress; values below `1.0` behave as `1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationTuning {
    /// Uncontested time an enemy needs to consume its target.
    pub claim_duration: Duration,
    /// Cooldown a searching enemy waits after finding no idle biscuit.
    pub retarget_delay: Duration,
    /// Clicks per second that correspond to full progress.
    pub rate_per_second_for_max: f32,
    /// Time progress must stay at full for the player to win.
    pub win_hold_duration: Duration,
    /// Time a defeated enemy stays stunned before fading.
    pub stun_duration: Duration,
    /// Length of the fade that precedes despawn.
    pub fade_duration: Duration,
}

impl Default for ArbitrationTuning {
    fn default() -> Self {
        Self {
            claim_duration: Duration::from_secs(3),
            retarget_delay: Duration::from_millis(500),
            rate_per_second_for_max: 5.0,
            win_hold_duration: Duration::from_secs(2),
            stun_duration: Duration::from_secs(10),
            fade_duration: Duration::from_millis(500),
        }
    }
}

/// Immutable representation of a single biscuit's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct BiscuitSnapshot {
    /// Unique identifier assigned to the biscuit.
    pub id: BiscuitId,
    /// Location of the biscuit.
    pub position: Position,
    /// Current arbitration state.
    pub state: BiscuitState,
    /// Enemy holding the claim, present exactly when not idle.
    pub claimant: Option<EnemyId>,
    /// Presses retained in the trailing window, zero unless contested.
    pub click_rate: u32,
    /// Time progress has continuously been at full, zero unless contested.
    pub continuous_success: Duration,
}

/// Read-only snapshot describing all biscuits.
#[derive(Clone, Debug, Default)]
pub struct BiscuitView {
    snapshots: Vec<BiscuitSnapshot>,
}

impl BiscuitView {
    /// Creates a new biscuit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BiscuitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured biscuit snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &BiscuitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided biscuit.
    #[must_use]
    pub fn get(&self, biscuit: BiscuitId) -> Option<&BiscuitSnapshot> {
        self.snapshots
            .binary_search_by_key(&biscuit, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BiscuitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Location of the enemy.
    pub position: Position,
    /// Current arbitration state.
    pub state: EnemyState,
    /// Biscuit targeted by the enemy, present exactly while claiming or waiting.
    pub target: Option<BiscuitId>,
    /// Uncontested claim time; frozen once the claim was contested.
    pub claim_elapsed: Duration,
    /// Time spent stunned.
    pub stun_elapsed: Duration,
    /// Progress of the despawn fade, present once the stun ran out.
    pub fade_elapsed: Option<Duration>,
    /// Remaining retarget cooldown while searching.
    pub retarget_cooldown: Duration,
}

impl EnemySnapshot {
    /// Reports whether the enemy should look for a target on this pass.
    #[must_use]
    pub fn ready_to_search(&self) -> bool {
        self.state == EnemyState::Searching && self.retarget_cooldown.is_zero()
    }
}

/// Read-only snapshot describing all enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ArbitrationTuning, BiscuitId, BiscuitSnapshot, BiscuitState, BiscuitView, ClaimError,
        EnemyId, EnemySnapshot, EnemyState, Position,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tuning_round_trips_through_bincode() {
        let tuning = ArbitrationTuning {
            claim_duration: Duration::from_millis(2_750),
            ..ArbitrationTuning::default()
        };
        assert_round_trip(&tuning);
        assert_round_trip(&ClaimError::BiscuitNotIdle);
    }

    #[test]
    fn default_tuning_matches_documented_thresholds() {
        let tuning = ArbitrationTuning::default();
        assert_eq!(tuning.claim_duration, Duration::from_secs(3));
        assert_eq!(tuning.retarget_delay, Duration::from_millis(500));
        assert_eq!(tuning.win_hold_duration, Duration::from_secs(2));
        assert_eq!(tuning.stun_duration, Duration::from_secs(10));
        assert_eq!(tuning.fade_duration, Duration::from_millis(500));
        assert!((tuning.rate_per_second_for_max - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_squared_is_symmetric() {
        let a = Position::new(1.0, 2.0);
        let b = Position::new(4.0, 6.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f32::EPSILON);
        assert!((b.distance_squared(a) - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn biscuit_view_sorts_and_finds_by_id() {
        let snapshot = |id: u32| BiscuitSnapshot {
            id: BiscuitId::new(id),
            position: Position::default(),
            state: BiscuitState::Idle,
            claimant: None,
            click_rate: 0,
            continuous_success: Duration::ZERO,
        };
        let view = BiscuitView::from_snapshots(vec![snapshot(7), snapshot(2), snapshot(4)]);

        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![2, 4, 7]);
        assert!(view.get(BiscuitId::new(4)).is_some());
        assert!(view.get(BiscuitId::new(5)).is_none());
    }

    #[test]
    fn only_searching_enemies_without_cooldown_are_ready() {
        let mut snapshot = EnemySnapshot {
            id: EnemyId::new(1),
            position: Position::default(),
            state: EnemyState::Searching,
            target: None,
            claim_elapsed: Duration::ZERO,
            stun_elapsed: Duration::ZERO,
            fade_elapsed: None,
            retarget_cooldown: Duration::ZERO,
        };
        assert!(snapshot.ready_to_search());

        snapshot.retarget_cooldown = Duration::from_millis(100);
        assert!(!snapshot.ready_to_search());

        snapshot.retarget_cooldown = Duration::ZERO;
        snapshot.state = EnemyState::Stunned;
        assert!(!snapshot.ready_to_search());
    }
}
