use std::time::Duration;

use invaders::bullets::BulletArena;
use invaders::entities::{BulletOwner, Direction};
use invaders::formation::*;
use invaders::settings::{LevelSettings, Playfield};
use invaders::ship::EnemyKind;

use rand::rngs::StdRng;
use rand::SeedableRng;

const FIELD: Playfield = Playfield { width: 500, height: 680 };
/// Longer than any step interval, so every update takes exactly one step.
const BIG_STEP: Duration = Duration::from_secs(2);

fn small_formation() -> EnemyShipFormation {
    EnemyShipFormation::new(&LevelSettings::new(3, 2, 60, 2000), FIELD)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn pos(column: usize, row: usize) -> GridPos {
    GridPos { column, row }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn builds_grid_with_row_kinds() {
    let f = small_formation();
    assert_eq!(f.len(), 6);
    assert_eq!(f.live_count(), 6);
    assert!(!f.is_empty());
    for column in 0..3 {
        assert_eq!(f.get(pos(column, 0)).map(|s| s.kind()), Some(EnemyKind::C));
        assert_eq!(f.get(pos(column, 1)).map(|s| s.kind()), Some(EnemyKind::B));
    }
    let first = f.get(pos(0, 0)).expect("ship at origin");
    assert_eq!((first.entity.x, first.entity.y), (INIT_POS_X, INIT_POS_Y));
    let last = f.get(pos(2, 1)).expect("ship at (2,1)");
    assert_eq!((last.entity.x, last.entity.y), (100, 140));
}

#[test]
fn bottom_row_are_the_shooters() {
    let f = small_formation();
    assert_eq!(f.shooters(), vec![pos(0, 1), pos(1, 1), pos(2, 1)]);
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn no_step_before_interval_elapses() {
    let mut f = small_formation();
    assert_eq!(f.update(Duration::from_millis(16)), None);
    assert_eq!(f.bounds(), Some((20, 100, 124, 156)));
}

#[test]
fn sweeps_right_then_descends_once_and_reverses() {
    let mut f = small_formation();
    let mut horizontal = 0;
    loop {
        match f.update(BIG_STEP).expect("a step every update") {
            FormationStep::Horizontal(dx) => {
                assert_eq!(dx, X_SPEED);
                horizontal += 1;
            }
            FormationStep::Descend(dy) => {
                assert_eq!(dy, DESCENT_STEP);
                break;
            }
            FormationStep::Reverse => panic!("reversed without descending"),
        }
    }
    // right edge starts at 124 and may not pass 500 - 20
    assert_eq!(horizontal, 44);
    assert_eq!(f.bounds(), Some((372, 120, 476, 176)));
    assert_eq!(f.heading(), Heading::Left);
    assert_eq!(f.update(BIG_STEP), Some(FormationStep::Horizontal(-X_SPEED)));
}

#[test]
fn reverses_in_place_at_bottom_margin() {
    // bottom edge 156 + 20 would pass 220 - 80
    let mut f = EnemyShipFormation::new(&LevelSettings::new(3, 2, 60, 2000), Playfield { width: 500, height: 220 });
    let step = loop {
        match f.update(BIG_STEP).expect("a step every update") {
            FormationStep::Horizontal(_) => continue,
            other => break other,
        }
    };
    assert_eq!(step, FormationStep::Reverse);
    assert_eq!(f.bounds().map(|b| b.1), Some(100));
    assert_eq!(f.heading(), Heading::Left);
}

#[test]
fn destroyed_ships_stay_put() {
    let mut f = small_formation();
    assert_eq!(f.update(Duration::from_millis(1100)), None);
    f.destroy(pos(0, 0));
    assert_eq!(f.update(Duration::from_millis(100)), Some(FormationStep::Horizontal(X_SPEED)));
    let wreck = f.get(pos(0, 0)).expect("still exploding");
    assert_eq!(wreck.entity.x, INIT_POS_X);
    let alive = f.get(pos(1, 0)).expect("alive");
    assert_eq!(alive.entity.x, 60 + X_SPEED);
}

#[test]
fn thinning_formation_speeds_up() {
    let mut f = small_formation();
    let full_step = f.step_interval();
    let (full_shot, _) = f.shooting_interval();
    f.destroy(pos(0, 0));
    f.destroy(pos(1, 0));
    f.destroy(pos(2, 0));
    assert!(f.step_interval() < full_step);
    let (thin_shot, variance) = f.shooting_interval();
    assert!(thin_shot < full_shot);
    assert_eq!(full_shot, Duration::from_millis(2000));
    assert_eq!(thin_shot, Duration::from_millis(1500));
    assert_eq!(variance, Duration::from_millis(300));
}

// ── Destruction ───────────────────────────────────────────────────────────────

#[test]
fn shooter_moves_up_the_column() {
    let mut f = small_formation();
    assert!(f.destroy(pos(1, 1)));
    assert_eq!(f.shooters(), vec![pos(0, 1), pos(1, 0), pos(2, 1)]);
    assert!(f.destroy(pos(1, 0)));
    assert_eq!(f.shooters(), vec![pos(0, 1), pos(2, 1)]);
}

#[test]
fn destroying_twice_is_rejected() {
    let mut f = small_formation();
    assert!(f.destroy(pos(0, 0)));
    assert!(!f.destroy(pos(0, 0)));
    assert!(!f.destroy(pos(9, 9)));
}

#[test]
fn empty_only_after_explosions_finish() {
    let mut f = small_formation();
    for column in 0..3 {
        for row in 0..2 {
            f.destroy(pos(column, row));
        }
    }
    assert_eq!(f.live_count(), 0);
    assert!(!f.is_empty());
    assert!(f.shooters().is_empty());

    assert_eq!(f.update(Duration::from_millis(100)), None);
    assert!(!f.is_empty());
    assert_eq!(f.len(), 6);

    f.update(Duration::from_millis(400));
    assert!(f.is_empty());
}

// ── Shooting ──────────────────────────────────────────────────────────────────

#[test]
fn shoots_down_from_a_bottom_ship() {
    let mut f = small_formation();
    let mut bullets = BulletArena::new();
    let mut rng = seeded_rng();
    assert!(!f.shoot(&mut bullets, &mut rng));

    f.update(BIG_STEP);
    assert!(f.shoot(&mut bullets, &mut rng));
    assert!(!f.shoot(&mut bullets, &mut rng));
    assert_eq!(bullets.len(), 1);

    let (_, b) = bullets.iter().next().expect("enemy bullet");
    assert_eq!(b.direction, Direction::Down);
    assert_eq!(b.owner, BulletOwner::Enemy);
    let from_shooter = f
        .shooters()
        .into_iter()
        .filter_map(|p| f.get(p))
        .any(|s| s.entity.center_x() == b.entity.center_x() && s.entity.y + s.entity.height() == b.entity.y);
    assert!(from_shooter);
}

#[test]
fn empty_formation_never_shoots() {
    let mut f = EnemyShipFormation::new(&LevelSettings::new(0, 0, 60, 2000), FIELD);
    let mut bullets = BulletArena::new();
    assert!(f.is_empty());
    assert_eq!(f.update(BIG_STEP), None);
    assert!(!f.shoot(&mut bullets, &mut seeded_rng()));
    assert!(bullets.is_empty());
}
