use thiserror::Error;

use crate::entities::SpriteType;
use crate::settings::GameMode;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("malformed high score record on line {line}: {content:?}")]
    MalformedScore { line: usize, content: String },

    #[error("no level settings for level {level} (table has {available} levels)")]
    UnknownLevel { level: u32, available: usize },

    #[error("{mode:?} needs {expected} player states, got {actual}")]
    PlayerCountMismatch { mode: GameMode, expected: usize, actual: usize },

    #[error("renderer has no sprite for {0:?}")]
    MissingSprite(SpriteType),

    #[error("invalid player name {0:?}: expected 3 letters A-Z")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
