/// Per-level simulation.
///
/// A `GameScreen` owns everything that lives for one level: the player
/// ships, the enemy formation, the bonus ship and every bullet in flight.
/// Each call to `tick` advances the level by one frame; `draw` hands the
/// result to a `Renderer`.  All randomness comes through the injected RNG so
/// tests can drive the level deterministically with a seeded generator.

use std::io;
use std::time::Duration;

use log::info;
use rand::Rng;
use smallvec::SmallVec;

use crate::bullets::{BulletArena, BulletId};
use crate::cooldown::Cooldown;
use crate::entities::{Bullet, BulletOwner, Direction, Entity, GameState, PlayerSlot, SpriteType};
use crate::error::{GameError, Result};
use crate::formation::{EnemyShipFormation, GridPos};
use crate::input::{InputSource, PlayerControls};
use crate::render::Renderer;
use crate::settings::{GameConfig, GameMode, LevelSettings, Playfield};
use crate::ship::{EnemyShip, Ship};

/// Bonus points per life left beyond the first at the end of a level.
pub const LIFE_SCORE: u32 = 100;
/// Y coordinate of the line separating the HUD from the playfield.
pub const SEPARATION_LINE_HEIGHT: i32 = 80;
/// Player ships sit this far above the bottom of the playfield.
pub const SHIP_BOTTOM_OFFSET: i32 = 30;
const SPECIAL_SHIP_SPEED: i32 = 2;

// ── Collision ─────────────────────────────────────────────────────────────────

/// Axis-aligned overlap test on centres and half-extents.  Touching edges do
/// not count.
pub fn check_collision(a: &Entity, b: &Entity) -> bool {
    let max_distance_x = a.width() / 2 + b.width() / 2;
    let max_distance_y = a.height() / 2 + b.height() / 2;
    let distance_x = (a.center_x() - b.center_x()).abs();
    let distance_y = (a.center_y() - b.center_y()).abs();
    distance_x < max_distance_x && distance_y < max_distance_y
}

// ── Screen configuration ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenConfig {
    pub playfield: Playfield,
    /// Countdown before input is accepted.
    pub input_delay: Duration,
    /// Pause between the level ending and the screen closing.
    pub screen_change: Duration,
    pub bonus_ship_interval: Duration,
    pub bonus_ship_variance: Duration,
    pub max_lives: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig::from(&GameConfig::default())
    }
}

impl From<&GameConfig> for ScreenConfig {
    fn from(config: &GameConfig) -> Self {
        ScreenConfig {
            playfield: config.playfield(),
            input_delay: Duration::from_millis(config.input_delay_ms),
            screen_change: Duration::from_millis(config.screen_change_ms),
            bonus_ship_interval: Duration::from_millis(config.bonus_ship_interval_ms),
            bonus_ship_variance: Duration::from_millis(config.bonus_ship_variance_ms),
            max_lives: config.max_lives,
        }
    }
}

// ── Level state ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Pre-level countdown; nothing moves.
    Countdown,
    Active,
    /// Level is decided; waiting out the settle delay.
    LevelFinishing,
    LevelDone,
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub ship: Ship,
    pub score: u32,
    pub lives: u32,
    pub bullets_shot: u32,
    pub ships_destroyed: u32,
}

impl PlayerState {
    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

pub struct GameScreen {
    level: u32,
    mode: GameMode,
    bonus_life: bool,
    config: ScreenConfig,
    players: SmallVec<[PlayerState; 2]>,
    formation: EnemyShipFormation,
    special: Option<EnemyShip>,
    special_cooldown: Cooldown,
    bullets: BulletArena,
    phase: Phase,
    input_delay: Cooldown,
    finish_delay: Cooldown,
}

impl GameScreen {
    /// Build the screen for the level recorded in `states`, one state per
    /// player in `mode`.  When `bonus_life` is set, every player still in the
    /// game below the life cap gains a life; the countdown only announces it
    /// if someone actually did.
    pub fn new(
        states: &[GameState],
        settings: &LevelSettings,
        mode: GameMode,
        bonus_life: bool,
        config: ScreenConfig,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let expected = mode.player_count();
        if states.len() != expected {
            return Err(GameError::PlayerCountMismatch { mode, expected, actual: states.len() });
        }

        let playfield = config.playfield;
        let ship_y = playfield.height - SHIP_BOTTOM_OFFSET;
        let mut life_granted = false;
        let players: SmallVec<[PlayerState; 2]> = states
            .iter()
            .zip(PlayerSlot::ALL)
            .map(|(state, slot)| {
                let x = match (mode, slot) {
                    (GameMode::SinglePlayer, _) => playfield.width / 2 - SpriteType::Ship.size().0 / 2,
                    (GameMode::TwoPlayer, PlayerSlot::One) => playfield.width / 2 - 20,
                    (GameMode::TwoPlayer, PlayerSlot::Two) => playfield.width / 2 + 20,
                };
                let mut lives = state.lives_remaining;
                if bonus_life && lives > 0 && lives < config.max_lives {
                    lives += 1;
                    life_granted = true;
                }
                PlayerState {
                    ship: Ship::new(x, ship_y, slot),
                    score: state.score,
                    lives,
                    bullets_shot: state.bullets_shot,
                    ships_destroyed: state.ships_destroyed,
                }
            })
            .collect();

        let mut special_cooldown = Cooldown::with_variance(config.bonus_ship_interval, config.bonus_ship_variance);
        special_cooldown.restart_with(rng);
        let mut input_delay = Cooldown::new(config.input_delay);
        input_delay.restart();

        Ok(GameScreen {
            level: states[0].level,
            mode,
            bonus_life: life_granted,
            config,
            players,
            formation: EnemyShipFormation::new(settings, playfield),
            special: None,
            special_cooldown,
            bullets: BulletArena::new(),
            phase: Phase::Countdown,
            input_delay,
            finish_delay: Cooldown::new(config.screen_change),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::LevelDone
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&PlayerState> {
        self.players.get(slot.index())
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> Option<&mut PlayerState> {
        self.players.get_mut(slot.index())
    }

    pub fn formation(&self) -> &EnemyShipFormation {
        &self.formation
    }

    pub fn formation_mut(&mut self) -> &mut EnemyShipFormation {
        &mut self.formation
    }

    pub fn special(&self) -> Option<&EnemyShip> {
        self.special.as_ref()
    }

    pub fn bullets(&self) -> &BulletArena {
        &self.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut BulletArena {
        &mut self.bullets
    }

    /// Whole seconds left on the pre-level countdown.
    pub fn countdown_seconds(&self) -> u64 {
        self.input_delay.remaining().as_secs()
    }

    /// Per-player snapshot.  Once the level is done this includes the
    /// remaining-lives bonus.
    pub fn game_states(&self) -> SmallVec<[GameState; 2]> {
        self.players
            .iter()
            .map(|p| GameState::new(self.level, p.score, p.lives, p.bullets_shot, p.ships_destroyed))
            .collect()
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    /// Advance the level by one frame that took `elapsed` of real time.
    pub fn tick(&mut self, elapsed: Duration, input: &impl InputSource, rng: &mut impl Rng) -> Phase {
        match self.phase {
            Phase::Countdown => {
                self.input_delay.tick(elapsed);
                if self.input_delay.is_finished() {
                    self.phase = Phase::Active;
                    info!("Level {} started", self.level);
                }
            }
            Phase::Active => {
                self.step(elapsed, input, rng);
                if self.is_level_over() {
                    self.phase = Phase::LevelFinishing;
                    self.finish_delay.restart();
                    info!("Level {} finished", self.level);
                }
            }
            Phase::LevelFinishing => {
                self.finish_delay.tick(elapsed);
                if self.finish_delay.is_finished() {
                    self.award_life_bonus();
                    self.phase = Phase::LevelDone;
                }
            }
            Phase::LevelDone => {}
        }
        self.phase
    }

    fn step(&mut self, elapsed: Duration, input: &impl InputSource, rng: &mut impl Rng) {
        let width = self.config.playfield.width;
        for player in self.players.iter_mut() {
            if player.ship.is_destroyed() || !player.is_alive() {
                continue;
            }
            let controls = PlayerControls::for_slot(player.ship.slot());
            let ship = &mut player.ship;
            let at_right_border = ship.entity.x + ship.entity.width() + ship.speed() > width - 1;
            let at_left_border = ship.entity.x - ship.speed() < 1;

            if input.is_key_down(controls.right) && !at_right_border {
                ship.move_right();
            }
            if input.is_key_down(controls.left) && !at_left_border {
                ship.move_left();
            }
            if input.is_key_down(controls.shoot) && ship.shoot(&mut self.bullets) {
                player.bullets_shot += 1;
            }
        }

        self.update_special(elapsed, rng);

        for player in self.players.iter_mut() {
            player.ship.update(elapsed);
        }
        self.formation.update(elapsed);
        self.formation.shoot(&mut self.bullets, rng);

        self.resolve_collisions();
        self.clean_bullets();
    }

    fn update_special(&mut self, elapsed: Duration, rng: &mut impl Rng) {
        self.special_cooldown.tick(elapsed);

        let mut explosion_over = false;
        if let Some(special) = self.special.as_mut() {
            special.update(elapsed);
            if !special.is_destroyed() {
                special.entity.translate(SPECIAL_SHIP_SPEED, 0);
            } else if special.explosion_finished() {
                explosion_over = true;
            }
        }
        if explosion_over {
            self.special = None;
        }

        if self.special.is_none() && self.special_cooldown.is_finished() {
            self.special = Some(EnemyShip::special());
            self.special_cooldown.restart_with(rng);
            info!("A special ship appears");
        }

        let escaped = self
            .special
            .as_ref()
            .map_or(false, |s| s.entity.x > self.config.playfield.width);
        if escaped {
            self.special = None;
            info!("The special ship has escaped");
        }
    }

    /// Resolve every bullet against its targets.  Each bullet resolves at
    /// most one enemy hit, and a player loses a life only on the transition
    /// into the destroyed state.
    fn resolve_collisions(&mut self) {
        for id in self.bullets.ids() {
            let Some(bullet) = self.bullets.get(id).cloned() else {
                continue;
            };
            match bullet.direction {
                Direction::Down => self.hit_players(id, &bullet),
                Direction::Up => self.hit_enemies(id, &bullet),
            }
        }
    }

    fn hit_players(&mut self, id: BulletId, bullet: &Bullet) {
        for player in self.players.iter_mut() {
            if !player.is_alive() || !check_collision(&bullet.entity, &player.ship.entity) {
                continue;
            }
            self.bullets.remove_later(id);
            if !player.ship.is_destroyed() {
                player.ship.destroy();
                player.lives -= 1;
                info!(
                    "Hit on player {} ship, {} lives remaining.",
                    player.ship.slot().number(),
                    player.lives
                );
            }
        }
    }

    fn hit_enemies(&mut self, id: BulletId, bullet: &Bullet) {
        let member_hit: Option<(GridPos, u32)> = self
            .formation
            .members()
            .find(|(_, ship)| !ship.is_destroyed() && check_collision(&bullet.entity, &ship.entity))
            .map(|(pos, ship)| (pos, ship.point_value()));
        if let Some((pos, points)) = member_hit {
            self.formation.destroy(pos);
            self.credit(bullet.owner, points);
            self.bullets.remove_later(id);
            return;
        }

        let special_hit = match self.special.as_mut() {
            Some(special) if !special.is_destroyed() && check_collision(&bullet.entity, &special.entity) => {
                special.destroy();
                Some(special.point_value())
            }
            _ => None,
        };
        if let Some(points) = special_hit {
            self.credit(bullet.owner, points);
            self.bullets.remove_later(id);
            info!("The special ship was destroyed");
        }
    }

    fn credit(&mut self, owner: BulletOwner, points: u32) {
        if let BulletOwner::Player(slot) = owner {
            if let Some(player) = self.players.get_mut(slot.index()) {
                player.score += points;
                player.ships_destroyed += 1;
            }
        }
    }

    /// Move every bullet, then drop the ones that crossed into the HUD or
    /// below the playfield, along with those consumed by collisions.
    fn clean_bullets(&mut self) {
        for bullet in self.bullets.iter_mut() {
            bullet.advance();
        }
        let height = self.config.playfield.height;
        let off_screen: Vec<BulletId> = self
            .bullets
            .iter()
            .filter(|(_, b)| b.entity.y < SEPARATION_LINE_HEIGHT || b.entity.y > height)
            .map(|(id, _)| id)
            .collect();
        for id in off_screen {
            self.bullets.remove_later(id);
        }
        self.bullets.flush_removals();
    }

    fn is_level_over(&self) -> bool {
        self.formation.is_empty() || self.players.iter().all(|p| !p.is_alive())
    }

    fn award_life_bonus(&mut self) {
        for player in self.players.iter_mut().filter(|p| p.is_alive()) {
            player.score += LIFE_SCORE * (player.lives - 1);
        }
        let scores: Vec<u32> = self.players.iter().map(|p| p.score).collect();
        info!("Screen cleared with a score of {:?}", scores);
    }

    // ── Drawing ──────────────────────────────────────────────────────────────

    pub fn draw(&self, renderer: &mut impl Renderer) -> io::Result<()> {
        let playfield = self.config.playfield;
        renderer.begin_frame(playfield)?;

        for player in self.players.iter().filter(|p| p.is_alive()) {
            let e = &player.ship.entity;
            renderer.draw_entity(e, e.x, e.y)?;
        }
        if let Some(special) = &self.special {
            renderer.draw_entity(&special.entity, special.entity.x, special.entity.y)?;
        }
        for (_, ship) in self.formation.members() {
            renderer.draw_entity(&ship.entity, ship.entity.x, ship.entity.y)?;
        }
        for (_, bullet) in self.bullets.iter() {
            renderer.draw_entity(&bullet.entity, bullet.entity.x, bullet.entity.y)?;
        }

        for player in self.players.iter() {
            let slot = player.ship.slot();
            renderer.draw_score(slot, player.score)?;
            renderer.draw_lives(slot, player.lives, slot.tint())?;
        }
        renderer.draw_horizontal_line(SEPARATION_LINE_HEIGHT - 1)?;

        if self.phase == Phase::Countdown {
            renderer.draw_countdown(self.level, self.countdown_seconds(), self.bonus_life)?;
            renderer.draw_horizontal_line(playfield.height / 2 - playfield.height / 12)?;
            renderer.draw_horizontal_line(playfield.height / 2 + playfield.height / 12)?;
        }

        renderer.finish_frame()
    }
}
