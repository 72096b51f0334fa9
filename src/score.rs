/// High-score records and their on-disk store.
///
/// File layout: one `NAME SCORE` record per line, best score first.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{GameError, Result};

pub const NAME_LENGTH: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Score {
    name: String,
    score: u32,
}

impl Score {
    /// `name` must be exactly three ASCII letters; it is stored upper-case.
    pub fn new(name: &str, score: u32) -> Result<Self> {
        if name.len() != NAME_LENGTH || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(GameError::InvalidName(name.to_string()));
        }
        Ok(Score { name: name.to_ascii_uppercase(), score })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    fn parse(line_no: usize, line: &str) -> Result<Self> {
        let malformed = || GameError::MalformedScore { line: line_no, content: line.to_string() };
        let mut parts = line.split_whitespace();
        let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let score = value.parse().map_err(|_| malformed())?;
        Score::new(name, score).map_err(|_| malformed())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.score)
    }
}

/// Higher scores sort first; ties fall back to name order.
impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        other.score.cmp(&self.score).then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Would `score` earn a place on a leaderboard capped at `max` entries?
pub fn qualifies(scores: &[Score], score: u32, max: usize) -> bool {
    score > 0 && (scores.len() < max || scores.iter().any(|s| s.score < score))
}

// ── Store ─────────────────────────────────────────────────────────────────────

pub trait ScoreStore {
    /// Records sorted best-first.
    fn load_high_scores(&self) -> Result<Vec<Score>>;

    fn save(&mut self, score: Score) -> Result<()>;

    fn delete_all(&mut self) -> Result<()>;
}

/// Leaderboard for display: errors are logged and yield an empty board.
pub fn load_or_empty(store: &impl ScoreStore) -> Vec<Score> {
    store.load_high_scores().unwrap_or_else(|e| {
        warn!("Couldn't load high scores: {e}");
        Vec::new()
    })
}

#[derive(Clone, Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    max_entries: usize,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        FileScoreStore { path: path.into(), max_entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, scores: &[Score]) -> Result<()> {
        let body: String = scores.iter().map(|s| format!("{s}\n")).collect();
        fs::write(&self.path, body)?;
        Ok(())
    }
}

impl ScoreStore for FileScoreStore {
    fn load_high_scores(&self) -> Result<Vec<Score>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut scores = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| Score::parse(i + 1, line.trim()))
            .collect::<Result<Vec<_>>>()?;
        scores.sort();
        scores.truncate(self.max_entries);
        Ok(scores)
    }

    /// Fails without touching the file if the existing board can't be read.
    fn save(&mut self, score: Score) -> Result<()> {
        let mut scores = self.load_high_scores()?;
        info!("Saving high score {score}");
        scores.push(score);
        scores.sort();
        scores.truncate(self.max_entries);
        self.write(&scores)
    }

    fn delete_all(&mut self) -> Result<()> {
        info!("Deleting all high scores");
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
