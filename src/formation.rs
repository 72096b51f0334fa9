/// The enemy formation: a grid of `EnemyShip`s that sweeps sideways, drops a
/// row whenever it reaches a side margin, and fires from the bottom of its
/// columns.  The fewer ships survive, the faster it moves and shoots.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::bullets::BulletArena;
use crate::cooldown::Cooldown;
use crate::entities::{Bullet, BulletOwner, Direction};
use crate::settings::{LevelSettings, Playfield};
use crate::ship::{EnemyKind, EnemyShip};

/// Top-left corner of the first ship.
pub const INIT_POS_X: i32 = 20;
pub const INIT_POS_Y: i32 = 100;
/// Distance between the top-left corners of neighbouring ships.
pub const SEPARATION_DISTANCE: i32 = 40;
pub const X_SPEED: i32 = 8;
pub const DESCENT_STEP: i32 = 20;
pub const SIDE_MARGIN: i32 = 20;
pub const BOTTOM_MARGIN: i32 = 80;
pub const ENEMY_BULLET_SPEED: i32 = 4;
/// Floor of the step interval, in reference ticks.
const MINIMUM_SPEED: u32 = 10;
/// Unit of `LevelSettings::base_speed`: one frame at 60 Hz.
const REFERENCE_TICK: Duration = Duration::from_micros(16_667);
const SHOOTING_VARIANCE: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub column: usize,
    pub row: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    fn flipped(self) -> Self {
        match self {
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }
}

/// What one movement step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormationStep {
    /// Moved sideways by this many pixels.
    Horizontal(i32),
    /// Hit a side margin: reversed and moved down by this many pixels.
    Descend(i32),
    /// Hit a side margin at the bottom margin: reversed in place.
    Reverse,
}

#[derive(Clone, Debug)]
pub struct EnemyShipFormation {
    ships: BTreeMap<GridPos, EnemyShip>,
    /// Column → row of its lowest surviving ship.
    shooters: BTreeMap<usize, usize>,
    capacity: usize,
    heading: Heading,
    base_speed: u32,
    shooting_frequency: u32,
    movement: Cooldown,
    shooting: Cooldown,
    playfield: Playfield,
}

impl EnemyShipFormation {
    pub fn new(settings: &LevelSettings, playfield: Playfield) -> Self {
        let mut ships = BTreeMap::new();
        let mut shooters = BTreeMap::new();
        for column in 0..settings.formation_width {
            for row in 0..settings.formation_height {
                let x = INIT_POS_X + column as i32 * SEPARATION_DISTANCE;
                let y = INIT_POS_Y + row as i32 * SEPARATION_DISTANCE;
                let kind = EnemyKind::for_row(row, settings.formation_height);
                ships.insert(GridPos { column, row }, EnemyShip::new(x, y, kind));
            }
            if settings.formation_height > 0 {
                shooters.insert(column, settings.formation_height - 1);
            }
        }

        let mut formation = EnemyShipFormation {
            capacity: ships.len(),
            ships,
            shooters,
            heading: Heading::Right,
            base_speed: settings.base_speed,
            shooting_frequency: settings.shooting_frequency,
            movement: Cooldown::new(Duration::ZERO),
            shooting: Cooldown::new(Duration::ZERO),
            playfield,
        };
        formation.movement = Cooldown::new(formation.step_interval());
        formation.movement.restart();
        let (interval, variance) = formation.shooting_interval();
        formation.shooting = Cooldown::with_variance(interval, variance);
        formation.shooting.restart();
        info!(
            "Initializing {}x{} ship formation in ({},{})",
            settings.formation_width, settings.formation_height, INIT_POS_X, INIT_POS_Y
        );
        formation
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// True once every ship has been destroyed *and* its explosion has run out.
    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Ships still present, including exploding ones.
    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn live_count(&self) -> usize {
        self.ships.values().filter(|s| !s.is_destroyed()).count()
    }

    pub fn get(&self, pos: GridPos) -> Option<&EnemyShip> {
        self.ships.get(&pos)
    }

    pub fn members(&self) -> impl Iterator<Item = (GridPos, &EnemyShip)> + '_ {
        self.ships.iter().map(|(pos, ship)| (*pos, ship))
    }

    /// The ships currently allowed to fire, one per surviving column.
    pub fn shooters(&self) -> Vec<GridPos> {
        self.shooters
            .iter()
            .map(|(&column, &row)| GridPos { column, row })
            .collect()
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// `(left, top, right, bottom)` edges of the surviving ships.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        self.ships
            .values()
            .filter(|s| !s.is_destroyed())
            .map(|s| {
                let e = &s.entity;
                (e.x, e.y, e.x + e.width(), e.y + e.height())
            })
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    }

    fn remaining_fraction(&self) -> f32 {
        if self.capacity == 0 {
            0.0
        } else {
            self.live_count() as f32 / self.capacity as f32
        }
    }

    /// Time between movement steps.  Shrinks quadratically as ships die.
    pub fn step_interval(&self) -> Duration {
        let fraction = self.remaining_fraction();
        let units = (fraction * fraction * self.base_speed as f32) as u32 + MINIMUM_SPEED;
        REFERENCE_TICK * units
    }

    /// Base shooting interval and its variance.  Shrinks to half as ships die.
    pub fn shooting_interval(&self) -> (Duration, Duration) {
        let scale = 0.5 + 0.5 * self.remaining_fraction();
        let interval = (self.shooting_frequency as f32 * scale) as u64;
        let variance = (interval as f32 * SHOOTING_VARIANCE) as u64;
        (Duration::from_millis(interval), Duration::from_millis(variance))
    }

    // ── Per-tick behaviour ───────────────────────────────────────────────────

    /// Advance timers, drop ships whose explosion has finished, and take a
    /// movement step if one is due.
    pub fn update(&mut self, elapsed: Duration) -> Option<FormationStep> {
        for ship in self.ships.values_mut() {
            ship.update(elapsed);
        }
        self.remove_expired();

        self.shooting.tick(elapsed);
        self.movement.tick(elapsed);
        if !self.movement.is_finished() {
            return None;
        }
        let bounds = self.bounds()?;

        let step = self.next_step(bounds);
        let (dx, dy) = match step {
            FormationStep::Horizontal(dx) => (dx, 0),
            FormationStep::Descend(dy) => (0, dy),
            FormationStep::Reverse => (0, 0),
        };
        for ship in self.ships.values_mut().filter(|s| !s.is_destroyed()) {
            ship.entity.translate(dx, dy);
        }

        let interval = self.step_interval();
        self.movement.set_duration(interval, Duration::ZERO);
        self.movement.restart();
        Some(step)
    }

    fn next_step(&mut self, (left, _, right, bottom): (i32, i32, i32, i32)) -> FormationStep {
        let would_cross = match self.heading {
            Heading::Right => right + X_SPEED > self.playfield.width - SIDE_MARGIN,
            Heading::Left => left - X_SPEED < SIDE_MARGIN,
        };
        if !would_cross {
            return match self.heading {
                Heading::Right => FormationStep::Horizontal(X_SPEED),
                Heading::Left => FormationStep::Horizontal(-X_SPEED),
            };
        }

        self.heading = self.heading.flipped();
        if bottom + DESCENT_STEP > self.playfield.height - BOTTOM_MARGIN {
            FormationStep::Reverse
        } else {
            FormationStep::Descend(DESCENT_STEP)
        }
    }

    /// Fire from the bottom ship of a random surviving column if the shooting
    /// cooldown allows.  Returns whether a bullet was fired.
    pub fn shoot(&mut self, bullets: &mut BulletArena, rng: &mut impl Rng) -> bool {
        if !self.shooting.is_finished() || self.shooters.is_empty() {
            return false;
        }
        let pick = rng.gen_range(0..self.shooters.len());
        let Some((&column, &row)) = self.shooters.iter().nth(pick) else {
            return false;
        };
        let Some(shooter) = self.ships.get(&GridPos { column, row }) else {
            return false;
        };

        let e = &shooter.entity;
        bullets.insert(Bullet::fired_from(
            e.center_x(),
            e.y + e.height(),
            ENEMY_BULLET_SPEED,
            Direction::Down,
            BulletOwner::Enemy,
        ));

        let (interval, variance) = self.shooting_interval();
        self.shooting.set_duration(interval, variance);
        self.shooting.restart_with(rng);
        true
    }

    /// Mark the ship at `pos` destroyed.  It stays in the formation until its
    /// explosion finishes.  Returns false if there was no live ship there.
    pub fn destroy(&mut self, pos: GridPos) -> bool {
        match self.ships.get_mut(&pos) {
            Some(ship) if !ship.is_destroyed() => ship.destroy(),
            _ => return false,
        }
        info!("Destroyed ship in ({},{})", pos.column, pos.row);

        if self.shooters.get(&pos.column) == Some(&pos.row) {
            let next = self
                .ships
                .range(GridPos { column: pos.column, row: 0 }..=GridPos { column: pos.column, row: usize::MAX })
                .filter(|(_, s)| !s.is_destroyed())
                .map(|(p, _)| p.row)
                .max();
            match next {
                Some(row) => {
                    self.shooters.insert(pos.column, row);
                }
                None => {
                    self.shooters.remove(&pos.column);
                    debug!("Column {} has no shooters left", pos.column);
                }
            }
        }
        true
    }

    fn remove_expired(&mut self) {
        let before = self.ships.len();
        self.ships.retain(|pos, ship| {
            let expired = ship.explosion_finished();
            if expired {
                debug!("Removed enemy ship in ({},{})", pos.column, pos.row);
            }
            !expired
        });
        if before != self.ships.len() && self.ships.is_empty() {
            info!("Formation cleared");
        }
    }
}
