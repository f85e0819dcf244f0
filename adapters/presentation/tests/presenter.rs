use std::time::Duration;

use anyhow::Result as AnyResult;
use biscuit_battle_core::{ArbitrationTuning, BiscuitId, Command, EnemyId, Event, Position};
use biscuit_battle_presentation::{BobPose, PresentationBackend, Presenter, STUNNED_ALPHA};
use biscuit_battle_world::{self as world, query, World};
use glam::Vec2;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Active(BiscuitId, bool),
    Rate(BiscuitId, f32),
    Pose(BiscuitId),
    Progress(BiscuitId, Option<f32>),
    BeamEndpoints(EnemyId, Vec2, Vec2),
    BeamEnabled(EnemyId, bool),
    Alpha(EnemyId, f32),
    EnemyActive(EnemyId, bool),
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    fn drain(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl PresentationBackend for Recorder {
    fn set_biscuit_active(&mut self, biscuit: BiscuitId, active: bool) -> AnyResult<()> {
        self.calls.push(Call::Active(biscuit, active));
        Ok(())
    }

    fn set_biscuit_animation_rate(&mut self, biscuit: BiscuitId, rate: f32) -> AnyResult<()> {
        self.calls.push(Call::Rate(biscuit, rate));
        Ok(())
    }

    fn set_biscuit_pose(&mut self, biscuit: BiscuitId, _: Vec2, _: BobPose) -> AnyResult<()> {
        self.calls.push(Call::Pose(biscuit));
        Ok(())
    }

    fn set_contest_progress(
        &mut self,
        biscuit: BiscuitId,
        progress: Option<f32>,
    ) -> AnyResult<()> {
        self.calls.push(Call::Progress(biscuit, progress));
        Ok(())
    }

    fn set_beam_endpoints(&mut self, enemy: EnemyId, start: Vec2, end: Vec2) -> AnyResult<()> {
        self.calls.push(Call::BeamEndpoints(enemy, start, end));
        Ok(())
    }

    fn set_beam_enabled(&mut self, enemy: EnemyId, enabled: bool) -> AnyResult<()> {
        self.calls.push(Call::BeamEnabled(enemy, enabled));
        Ok(())
    }

    fn set_enemy_alpha(&mut self, enemy: EnemyId, alpha: f32) -> AnyResult<()> {
        self.calls.push(Call::Alpha(enemy, alpha));
        Ok(())
    }

    fn set_enemy_active(&mut self, enemy: EnemyId, active: bool) -> AnyResult<()> {
        self.calls.push(Call::EnemyActive(enemy, active));
        Ok(())
    }
}

struct Stage {
    world: World,
    presenter: Presenter,
    backend: Recorder,
}

impl Stage {
    fn new() -> Self {
        Self {
            world: World::new(),
            presenter: Presenter::new(),
            backend: Recorder::default(),
        }
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.presenter
            .handle(
                &events,
                &query::biscuit_view(&self.world),
                &query::enemy_view(&self.world),
                query::tuning(&self.world).fade_duration,
                &mut self.backend,
            )
            .expect("recorder never fails");
        events
    }

    fn tick(&mut self, millis: u64) -> Vec<Event> {
        self.apply(Command::Tick {
            dt: Duration::from_millis(millis),
        })
    }
}

fn setup() -> (Stage, EnemyId, BiscuitId) {
    let mut stage = Stage::new();
    let _ = stage.apply(Command::SpawnBiscuit {
        position: Position::new(0.0, 0.0),
    });
    let _ = stage.apply(Command::SpawnEnemy {
        position: Position::new(3.0, 4.0),
    });
    (stage, EnemyId::new(0), BiscuitId::new(0))
}

#[test]
fn spawned_biscuit_animates_until_claimed() {
    let (mut stage, enemy, biscuit) = setup();
    let calls = stage.backend.drain();
    assert!(calls.contains(&Call::Active(biscuit, true)));
    assert!(calls.contains(&Call::Rate(biscuit, 1.0)));
    assert!(calls.contains(&Call::EnemyActive(enemy, true)));
    assert!(calls.contains(&Call::Alpha(enemy, 1.0)));

    let _ = stage.tick(16);
    assert_eq!(stage.backend.drain(), vec![Call::Pose(biscuit)]);

    let _ = stage.apply(Command::ClaimBiscuit { enemy, biscuit });
    assert_eq!(
        stage.backend.drain(),
        vec![Call::Rate(biscuit, 0.0), Call::BeamEnabled(enemy, true)]
    );
    assert_eq!(stage.presenter.bob(biscuit).map(|bob| bob.rate()), Some(0.0));

    let _ = stage.tick(16);
    let calls = stage.backend.drain();
    assert!(calls.contains(&Call::BeamEndpoints(
        enemy,
        Vec2::new(3.0, 4.0),
        Vec2::new(0.0, 0.0)
    )));
}

#[test]
fn contest_shows_progress_and_release_hides_it() {
    let (mut stage, enemy, biscuit) = setup();
    let _ = stage.apply(Command::ClaimBiscuit { enemy, biscuit });
    let _ = stage.backend.drain();

    let _ = stage.apply(Command::PressBiscuit { biscuit });
    assert_eq!(
        stage.backend.drain(),
        vec![Call::Progress(biscuit, Some(0.0))]
    );

    for _ in 0..4 {
        let _ = stage.apply(Command::PressBiscuit { biscuit });
    }
    let _ = stage.tick(100);
    assert!(stage
        .backend
        .drain()
        .contains(&Call::Progress(biscuit, Some(0.8))));

    let _ = stage.apply(Command::ReleaseBiscuit { biscuit, enemy });
    assert_eq!(
        stage.backend.drain(),
        vec![
            Call::BeamEnabled(enemy, false),
            Call::Progress(biscuit, None),
            Call::Rate(biscuit, 1.0),
        ]
    );
}

#[test]
fn stunned_enemy_fades_back_to_opaque() {
    let (mut stage, enemy, biscuit) = setup();
    let _ = stage.apply(Command::ConfigureArbitration {
        tuning: ArbitrationTuning {
            win_hold_duration: Duration::from_millis(100),
            ..Default::default()
        },
    });
    let _ = stage.apply(Command::ClaimBiscuit { enemy, biscuit });
    let _ = stage.apply(Command::PressBiscuit { biscuit });
    for _ in 0..5 {
        let _ = stage.apply(Command::PressBiscuit { biscuit });
    }
    let _ = stage.backend.drain();

    let events = stage.tick(100);
    assert!(events.contains(&Event::EnemyStunned { enemy }));
    let calls = stage.backend.drain();
    assert!(calls.contains(&Call::Progress(biscuit, None)));
    assert!(calls.contains(&Call::Active(biscuit, false)));
    assert!(calls.contains(&Call::BeamEnabled(enemy, false)));
    assert!(calls.contains(&Call::Alpha(enemy, STUNNED_ALPHA)));
    assert!(stage.presenter.bob(biscuit).is_none());

    let mut last_alpha = STUNNED_ALPHA;
    let mut hidden = false;
    for _ in 0..105 {
        let _ = stage.tick(100);
        for call in stage.backend.drain() {
            match call {
                Call::Alpha(_, alpha) => {
                    assert!(alpha >= last_alpha, "alpha must never drop during fade");
                    last_alpha = alpha;
                }
                Call::EnemyActive(id, false) if id == enemy => hidden = true,
                _ => {}
            }
        }
    }
    assert!(last_alpha > STUNNED_ALPHA, "fade should raise opacity");
    assert!(query::enemy(&stage.world, enemy).is_none());
    assert!(hidden, "despawned enemy sprite is hidden");
}

#[test]
fn removed_enemy_drops_beam_and_sprite() {
    let (mut stage, enemy, biscuit) = setup();
    let _ = stage.apply(Command::ClaimBiscuit { enemy, biscuit });
    let _ = stage.backend.drain();

    let _ = stage.apply(Command::RemoveEnemy { enemy });
    let calls = stage.backend.drain();
    assert!(calls.contains(&Call::BeamEnabled(enemy, false)));
    assert_eq!(calls.last(), Some(&Call::EnemyActive(enemy, false)));
    assert!(calls.contains(&Call::Rate(biscuit, 1.0)));
}
