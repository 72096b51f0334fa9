/// Player ships and enemy ships.

use std::time::Duration;

use crate::bullets::BulletArena;
use crate::cooldown::Cooldown;
use crate::entities::{Bullet, BulletOwner, Direction, Entity, PlayerSlot, SpriteType, Tint};

// ── Player ship ───────────────────────────────────────────────────────────────

/// Pixels moved per `move_left` / `move_right`.
pub const SHIP_SPEED: i32 = 2;
pub const SHIP_SHOOTING_INTERVAL: Duration = Duration::from_millis(750);
/// How long a hit ship stays in its destroyed state.
pub const SHIP_DESTRUCTION_RECOVERY: Duration = Duration::from_millis(1000);
pub const SHIP_BULLET_SPEED: i32 = 6;
/// Concurrent live bullets allowed per player.
pub const MAX_BULLETS_PER_PLAYER: usize = 1;

#[derive(Clone, Debug)]
pub struct Ship {
    pub entity: Entity,
    slot: PlayerSlot,
    speed: i32,
    shooting: Cooldown,
    destruction: Cooldown,
    destroyed: bool,
}

impl Ship {
    pub fn new(x: i32, y: i32, slot: PlayerSlot) -> Self {
        Ship {
            entity: Entity::new(x, y, SpriteType::Ship, slot.tint()),
            slot,
            speed: SHIP_SPEED,
            shooting: Cooldown::new(SHIP_SHOOTING_INTERVAL),
            destruction: Cooldown::new(SHIP_DESTRUCTION_RECOVERY),
            destroyed: false,
        }
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn move_left(&mut self) {
        self.entity.translate(-self.speed, 0);
    }

    pub fn move_right(&mut self) {
        self.entity.translate(self.speed, 0);
    }

    /// Fire one bullet from the ship's horizontal centre if the shooting
    /// cooldown has elapsed and the player has no bullet still in flight.
    /// Returns whether a bullet was created.
    pub fn shoot(&mut self, bullets: &mut BulletArena) -> bool {
        let owner = BulletOwner::Player(self.slot);
        if !self.shooting.is_finished() || bullets.count_owned_by(owner) >= MAX_BULLETS_PER_PLAYER {
            return false;
        }
        self.shooting.restart();
        bullets.insert(Bullet::fired_from(
            self.entity.center_x(),
            self.entity.y,
            SHIP_BULLET_SPEED,
            Direction::Up,
            owner,
        ));
        true
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.destruction.restart();
        self.entity.sprite = SpriteType::ShipDestroyed;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Advance timers; a destroyed ship recovers once its cooldown elapses.
    pub fn update(&mut self, elapsed: Duration) {
        self.shooting.tick(elapsed);
        self.destruction.tick(elapsed);
        if self.destroyed && self.destruction.is_finished() {
            self.destroyed = false;
            self.entity.sprite = SpriteType::Ship;
        }
    }
}

// ── Enemy ships ───────────────────────────────────────────────────────────────

pub const ENEMY_ANIMATION_INTERVAL: Duration = Duration::from_millis(500);
pub const ENEMY_EXPLOSION_TIME: Duration = Duration::from_millis(500);
/// Bonus ship spawn point, just off the left edge.
pub const SPECIAL_SPAWN: (i32, i32) = (-32, 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    A,
    B,
    C,
    Special,
}

impl EnemyKind {
    pub fn point_value(self) -> u32 {
        match self {
            EnemyKind::A => 10,
            EnemyKind::B => 20,
            EnemyKind::C => 30,
            EnemyKind::Special => 100,
        }
    }

    /// The two animation frames for this kind.
    fn frames(self) -> (SpriteType, SpriteType) {
        match self {
            EnemyKind::A => (SpriteType::EnemyShipA1, SpriteType::EnemyShipA2),
            EnemyKind::B => (SpriteType::EnemyShipB1, SpriteType::EnemyShipB2),
            EnemyKind::C => (SpriteType::EnemyShipC1, SpriteType::EnemyShipC2),
            EnemyKind::Special => (SpriteType::EnemyShipSpecial, SpriteType::EnemyShipSpecial),
        }
    }

    /// Kind for grid row `row` of a formation `rows` tall: the top fifth is
    /// type C, the next two fifths type B, the rest type A.
    pub fn for_row(row: usize, rows: usize) -> Self {
        let fraction = row as f32 / rows.max(1) as f32;
        if fraction < 0.2 {
            EnemyKind::C
        } else if fraction < 0.6 {
            EnemyKind::B
        } else {
            EnemyKind::A
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnemyShip {
    pub entity: Entity,
    kind: EnemyKind,
    destroyed: bool,
    explosion: Cooldown,
    animation: Cooldown,
}

impl EnemyShip {
    pub fn new(x: i32, y: i32, kind: EnemyKind) -> Self {
        let (first, _) = kind.frames();
        let tint = match kind {
            EnemyKind::Special => Tint::Red,
            _ => Tint::White,
        };
        let mut animation = Cooldown::new(ENEMY_ANIMATION_INTERVAL);
        animation.restart();
        EnemyShip {
            entity: Entity::new(x, y, first, tint),
            kind,
            destroyed: false,
            explosion: Cooldown::new(ENEMY_EXPLOSION_TIME),
            animation,
        }
    }

    /// The bonus ship, entering from the left.
    pub fn special() -> Self {
        EnemyShip::new(SPECIAL_SPAWN.0, SPECIAL_SPAWN.1, EnemyKind::Special)
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn point_value(&self) -> u32 {
        self.kind.point_value()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// True once a destroyed ship's explosion has finished showing.
    pub fn explosion_finished(&self) -> bool {
        self.destroyed && self.explosion.is_finished()
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.explosion.restart();
        self.entity.sprite = SpriteType::Explosion;
    }

    pub fn update(&mut self, elapsed: Duration) {
        if self.destroyed {
            self.explosion.tick(elapsed);
            return;
        }
        self.animation.tick(elapsed);
        if self.animation.is_finished() {
            self.animation.restart();
            let (first, second) = self.kind.frames();
            self.entity.sprite = if self.entity.sprite == first { second } else { first };
        }
    }
}
