/// Difficulty tables, game mode and the optional TOML configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GameError, Result};

// ── Per-level tuning ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelSettings {
    /// Formation columns.
    pub formation_width: usize,
    /// Formation rows.
    pub formation_height: usize,
    /// Formation movement pace; lower is faster.
    pub base_speed: u32,
    /// Milliseconds between formation shots.
    pub shooting_frequency: u32,
}

impl LevelSettings {
    pub const fn new(formation_width: usize, formation_height: usize, base_speed: u32, shooting_frequency: u32) -> Self {
        LevelSettings { formation_width, formation_height, base_speed, shooting_frequency }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    /// Easy → Normal → Hard → Easy.
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn level_table(self) -> LevelTable {
        let levels: &[LevelSettings] = match self {
            Difficulty::Easy => &EASY_LEVELS,
            Difficulty::Normal => &NORMAL_LEVELS,
            Difficulty::Hard => &HARD_LEVELS,
        };
        LevelTable::new(levels.to_vec())
    }
}

const EASY_LEVELS: [LevelSettings; 7] = [
    LevelSettings::new(3, 2, 60, 2000),
    LevelSettings::new(3, 3, 60, 2000),
    LevelSettings::new(4, 3, 50, 1500),
    LevelSettings::new(4, 3, 40, 1500),
    LevelSettings::new(4, 3, 40, 1000),
    LevelSettings::new(4, 4, 30, 1000),
    LevelSettings::new(4, 4, 20, 500),
];

const NORMAL_LEVELS: [LevelSettings; 7] = [
    LevelSettings::new(3, 3, 40, 1500),
    LevelSettings::new(4, 3, 35, 1500),
    LevelSettings::new(4, 4, 35, 1000),
    LevelSettings::new(5, 4, 30, 800),
    LevelSettings::new(5, 4, 30, 700),
    LevelSettings::new(6, 5, 25, 500),
    LevelSettings::new(6, 5, 20, 500),
];

const HARD_LEVELS: [LevelSettings; 7] = [
    LevelSettings::new(4, 3, 30, 1000),
    LevelSettings::new(4, 4, 25, 1000),
    LevelSettings::new(5, 4, 20, 800),
    LevelSettings::new(6, 5, 15, 700),
    LevelSettings::new(7, 6, 15, 600),
    LevelSettings::new(7, 7, 10, 400),
    LevelSettings::new(8, 7, 5, 200),
];

/// Level settings indexed by 1-based level number.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelTable {
    levels: Vec<LevelSettings>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelSettings>) -> Self {
        LevelTable { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn settings_for(&self, level: u32) -> Result<LevelSettings> {
        (level as usize)
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
            .copied()
            .ok_or(GameError::UnknownLevel { level, available: self.levels.len() })
    }
}

// ── Game mode ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    SinglePlayer,
    TwoPlayer,
}

impl GameMode {
    pub fn player_count(self) -> usize {
        match self {
            GameMode::SinglePlayer => 1,
            GameMode::TwoPlayer => 2,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            GameMode::SinglePlayer => GameMode::TwoPlayer,
            GameMode::TwoPlayer => GameMode::SinglePlayer,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::SinglePlayer => "1 PLAYER",
            GameMode::TwoPlayer => "2 PLAYERS",
        }
    }
}

// ── Playfield ─────────────────────────────────────────────────────────────────

/// Simulation area in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playfield {
    pub width: i32,
    pub height: i32,
}

// ── Config file ───────────────────────────────────────────────────────────────

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "INVADERS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "invaders.toml";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub fps: u32,
    pub width: i32,
    pub height: i32,
    pub input_delay_ms: u64,
    pub screen_change_ms: u64,
    pub bonus_ship_interval_ms: u64,
    pub bonus_ship_variance_ms: u64,
    pub max_lives: u32,
    pub num_levels: u32,
    pub extra_life_frequency: u32,
    pub max_high_scores: usize,
    pub log_file: PathBuf,
    pub high_score_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        GameConfig {
            fps: 60,
            width: 500,
            height: 680,
            input_delay_ms: 6000,
            screen_change_ms: 1500,
            bonus_ship_interval_ms: 20000,
            bonus_ship_variance_ms: 10000,
            max_lives: 3,
            num_levels: 7,
            extra_life_frequency: 3,
            max_high_scores: 7,
            log_file: PathBuf::from("invaders.log"),
            high_score_file: PathBuf::from(home).join(".invaders_scores"),
        }
    }
}

impl GameConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        GameConfig::from_toml(&text)
    }

    /// Load `path`, falling back to defaults.  The second element carries a
    /// message describing why the defaults were used, if they were.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        let path = path.as_ref();
        if !path.exists() {
            return (GameConfig::default(), None);
        }
        match GameConfig::load_from_file(path) {
            Ok(config) => (config, None),
            Err(e) => (GameConfig::default(), Some(format!("{}: {e}", path.display()))),
        }
    }

    /// Config file named by `INVADERS_CONFIG`, or `invaders.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn playfield(&self) -> Playfield {
        Playfield { width: self.width, height: self.height }
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    /// Whether `level` grants a bonus life when it starts.
    pub fn is_bonus_life_level(&self, level: u32) -> bool {
        self.extra_life_frequency > 0 && level % self.extra_life_frequency == 0
    }
}
