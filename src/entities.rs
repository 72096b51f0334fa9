/// Core game data types: positions, sprites, bullets and the per-level
/// progress snapshot.  Behaviour lives in `ship`, `formation` and `compute`.

// ── Sprites ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpriteType {
    Ship,
    ShipDestroyed,
    Bullet,
    EnemyBullet,
    EnemyShipA1,
    EnemyShipA2,
    EnemyShipB1,
    EnemyShipB2,
    EnemyShipC1,
    EnemyShipC2,
    EnemyShipSpecial,
    Explosion,
}

impl SpriteType {
    /// Every sprite the simulation can construct.  Renderers check their
    /// mappings against this list once at startup.
    pub const ALL: [SpriteType; 12] = [
        SpriteType::Ship,
        SpriteType::ShipDestroyed,
        SpriteType::Bullet,
        SpriteType::EnemyBullet,
        SpriteType::EnemyShipA1,
        SpriteType::EnemyShipA2,
        SpriteType::EnemyShipB1,
        SpriteType::EnemyShipB2,
        SpriteType::EnemyShipC1,
        SpriteType::EnemyShipC2,
        SpriteType::EnemyShipSpecial,
        SpriteType::Explosion,
    ];

    /// Pixel size `(width, height)` of an entity constructed with this sprite.
    pub fn size(self) -> (i32, i32) {
        match self {
            SpriteType::Ship | SpriteType::ShipDestroyed => (26, 16),
            SpriteType::Bullet | SpriteType::EnemyBullet => (6, 10),
            SpriteType::EnemyShipA1
            | SpriteType::EnemyShipA2
            | SpriteType::EnemyShipB1
            | SpriteType::EnemyShipB2
            | SpriteType::EnemyShipC1
            | SpriteType::EnemyShipC2 => (24, 16),
            SpriteType::EnemyShipSpecial => (32, 14),
            SpriteType::Explosion => (26, 14),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tint {
    Green,
    Blue,
    White,
    Red,
}

// ── Entity ────────────────────────────────────────────────────────────────────

/// A positioned, sized, coloured drawable.  `(x, y)` is the top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub x: i32,
    pub y: i32,
    width: i32,
    height: i32,
    pub tint: Tint,
    pub sprite: SpriteType,
}

impl Entity {
    /// Width and height are fixed here from the sprite and never change,
    /// even when the sprite is later swapped (e.g. for an explosion).
    pub fn new(x: i32, y: i32, sprite: SpriteType, tint: Tint) -> Self {
        let (width, height) = sprite.size();
        Entity { x, y, width, height, tint, sprite }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }
}

// ── Players & bullets ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    /// Zero-based index into per-player arrays.
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    /// Owner id as shown to players: 1 or 2.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn tint(self) -> Tint {
        match self {
            PlayerSlot::One => Tint::Green,
            PlayerSlot::Two => Tint::Blue,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Enemy,
    Player(PlayerSlot),
}

impl BulletOwner {
    /// 0 for enemy bullets, 1 or 2 for player bullets.
    pub fn id(self) -> u8 {
        match self {
            BulletOwner::Enemy => 0,
            BulletOwner::Player(slot) => slot.number(),
        }
    }
}

/// A projectile.  Direction drives movement and collision targets; owner
/// drives score attribution.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub entity: Entity,
    /// Pixels travelled per tick, always positive.
    pub speed: i32,
    pub direction: Direction,
    pub owner: BulletOwner,
}

impl Bullet {
    /// Create a bullet whose top edge is at `y` and whose horizontal centre
    /// is at `center_x`.
    pub fn fired_from(center_x: i32, y: i32, speed: i32, direction: Direction, owner: BulletOwner) -> Self {
        let sprite = match owner {
            BulletOwner::Enemy => SpriteType::EnemyBullet,
            BulletOwner::Player(_) => SpriteType::Bullet,
        };
        let (width, _) = sprite.size();
        Bullet {
            entity: Entity::new(center_x - width / 2, y, sprite, Tint::White),
            speed,
            direction,
            owner,
        }
    }

    /// Signed vertical velocity: negative moves up the screen.
    pub fn velocity(&self) -> i32 {
        match self.direction {
            Direction::Up => -self.speed,
            Direction::Down => self.speed,
        }
    }

    pub fn advance(&mut self) {
        let dy = self.velocity();
        self.entity.translate(0, dy);
    }
}

// ── Cross-level progress ──────────────────────────────────────────────────────

/// Immutable snapshot of one player's progress, handed from one level to the
/// next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub level: u32,
    pub score: u32,
    pub lives_remaining: u32,
    pub bullets_shot: u32,
    pub ships_destroyed: u32,
}

impl GameState {
    pub fn new(level: u32, score: u32, lives_remaining: u32, bullets_shot: u32, ships_destroyed: u32) -> Self {
        GameState { level, score, lives_remaining, bullets_shot, ships_destroyed }
    }

    /// Fresh state for level 1.
    pub fn initial(lives: u32) -> Self {
        GameState::new(1, 0, lives, 0, 0)
    }

    /// Same progress, advanced to the following level.
    pub fn next_level(&self) -> Self {
        GameState { level: self.level + 1, ..*self }
    }

    pub fn is_alive(&self) -> bool {
        self.lives_remaining > 0
    }

    /// Percentage of shots that destroyed something.
    pub fn accuracy(&self) -> f32 {
        if self.bullets_shot == 0 {
            0.0
        } else {
            self.ships_destroyed as f32 / self.bullets_shot as f32 * 100.0
        }
    }
}
