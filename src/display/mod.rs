/// Rendering layer. All terminal I/O lives here.
///
/// The simulation works in pixels; this module scales those coordinates onto
/// the terminal grid.  Row 0 holds the HUD, the remaining rows show the
/// playfield.  No game logic is performed here.

use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use invaders::entities::{Entity, GameState, PlayerSlot, SpriteType, Tint};
use invaders::error::GameError;
use invaders::render::Renderer;
use invaders::score::Score;
use invaders::settings::{Difficulty, GameMode, Playfield};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_LINE: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_TITLE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;
const C_HIGHLIGHT: Color = Color::Yellow;

fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Green => Color::Green,
        Tint::Blue => Color::Blue,
        Tint::White => Color::White,
        Tint::Red => Color::Red,
    }
}

// ── Sprites ───────────────────────────────────────────────────────────────────

/// Terminal glyph for every sprite the simulation can produce.
pub struct SpriteAtlas {
    glyphs: HashMap<SpriteType, &'static str>,
}

impl SpriteAtlas {
    pub fn terminal() -> Self {
        let glyphs = HashMap::from([
            (SpriteType::Ship, "/▲\\"),
            (SpriteType::ShipDestroyed, "*#*"),
            (SpriteType::Bullet, "║"),
            (SpriteType::EnemyBullet, "↓"),
            (SpriteType::EnemyShipA1, "<▼>"),
            (SpriteType::EnemyShipA2, ">▼<"),
            (SpriteType::EnemyShipB1, "(◉)"),
            (SpriteType::EnemyShipB2, ")◉("),
            (SpriteType::EnemyShipC1, "«▼»"),
            (SpriteType::EnemyShipC2, "»▼«"),
            (SpriteType::EnemyShipSpecial, "<=◎=>"),
            (SpriteType::Explosion, "\\*/"),
        ]);
        SpriteAtlas { glyphs }
    }

    /// Fails on the first sprite without a glyph.
    pub fn validate(&self) -> Result<(), GameError> {
        match SpriteType::ALL.iter().find(|s| !self.glyphs.contains_key(s)) {
            Some(missing) => Err(GameError::MissingSprite(*missing)),
            None => Ok(()),
        }
    }

    fn glyph(&self, sprite: SpriteType) -> Option<&'static str> {
        self.glyphs.get(&sprite).copied()
    }
}

// ── Terminal renderer ─────────────────────────────────────────────────────────

pub struct TerminalRenderer<'a, W: Write> {
    out: &'a mut W,
    atlas: &'a SpriteAtlas,
    cols: u16,
    rows: u16,
    playfield: Playfield,
}

impl<'a, W: Write> TerminalRenderer<'a, W> {
    pub fn new(out: &'a mut W, atlas: &'a SpriteAtlas, playfield: Playfield) -> std::io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(TerminalRenderer { out, atlas, cols, rows, playfield })
    }

    fn to_col(&self, x: i32) -> Option<u16> {
        if x < 0 || x >= self.playfield.width {
            return None;
        }
        Some((x as i64 * self.cols as i64 / self.playfield.width as i64) as u16)
    }

    fn to_row(&self, y: i32) -> Option<u16> {
        if y < 0 || y >= self.playfield.height {
            return None;
        }
        let usable = self.rows.saturating_sub(1) as i64;
        Some(1 + (y as i64 * usable / self.playfield.height as i64) as u16)
    }

    fn centered(&mut self, row: u16, text: &str, color: Color) -> std::io::Result<()> {
        centered(&mut *self.out, self.cols, row, text, color)
    }
}

impl<'a, W: Write> Renderer for TerminalRenderer<'a, W> {
    fn begin_frame(&mut self, playfield: Playfield) -> std::io::Result<()> {
        self.playfield = playfield;
        let (cols, rows) = terminal::size()?;
        self.cols = cols;
        self.rows = rows;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn draw_entity(&mut self, entity: &Entity, x: i32, y: i32) -> std::io::Result<()> {
        let Some(glyph) = self.atlas.glyph(entity.sprite) else {
            return Ok(());
        };
        let (Some(col), Some(row)) = (self.to_col(x + entity.width() / 2), self.to_row(y + entity.height() / 2)) else {
            return Ok(());
        };
        let half = glyph.chars().count() as u16 / 2;
        self.out.queue(cursor::MoveTo(col.saturating_sub(half), row))?;
        self.out.queue(style::SetForegroundColor(tint_color(entity.tint)))?;
        self.out.queue(Print(glyph))?;
        Ok(())
    }

    fn draw_score(&mut self, slot: PlayerSlot, score: u32) -> std::io::Result<()> {
        let col = hud_column(self.cols, slot);
        self.out.queue(cursor::MoveTo(col, 0))?;
        self.out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
        self.out.queue(Print(format!("P{} {:>5}", slot.number(), score)))?;
        Ok(())
    }

    fn draw_lives(&mut self, slot: PlayerSlot, lives: u32, tint: Tint) -> std::io::Result<()> {
        let col = hud_column(self.cols, slot) + 10;
        self.out.queue(cursor::MoveTo(col, 0))?;
        self.out.queue(style::SetForegroundColor(tint_color(tint)))?;
        self.out.queue(Print("♥".repeat(lives as usize)))?;
        Ok(())
    }

    fn draw_horizontal_line(&mut self, y: i32) -> std::io::Result<()> {
        let Some(row) = self.to_row(y) else {
            return Ok(());
        };
        self.out.queue(cursor::MoveTo(0, row))?;
        self.out.queue(style::SetForegroundColor(C_LINE))?;
        self.out.queue(Print("─".repeat(self.cols as usize)))?;
        Ok(())
    }

    fn draw_countdown(&mut self, level: u32, seconds: u64, bonus_life: bool) -> std::io::Result<()> {
        let mid = self.rows / 2;
        if seconds >= 4 {
            let text = if bonus_life { format!("Level {level} - Bonus life!") } else { format!("Level {level}") };
            self.centered(mid, &text, C_HIGHLIGHT)
        } else if seconds > 0 {
            self.centered(mid, &seconds.to_string(), C_HIGHLIGHT)
        } else {
            self.centered(mid, "GO!", C_HIGHLIGHT)
        }
    }

    fn draw_results(&mut self, states: &[GameState], is_new_record: bool) -> std::io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        let mut row = (self.rows / 2).saturating_sub(4 + 3 * states.len() as u16);
        self.centered(row, "╔════════════════════╗", Color::Red)?;
        self.centered(row + 1, "║     GAME  OVER     ║", Color::Red)?;
        self.centered(row + 2, "╚════════════════════╝", Color::Red)?;
        row += 4;

        for (i, state) in states.iter().enumerate() {
            if states.len() > 1 {
                self.centered(row, &format!("Player {}", i + 1), C_TITLE)?;
                row += 1;
            }
            let lines = [
                format!("Score          {:>6}", state.score),
                format!("Lives left     {:>6}", state.lives_remaining),
                format!("Bullets shot   {:>6}", state.bullets_shot),
                format!("Ships destroyed{:>6}", state.ships_destroyed),
                format!("Accuracy      {:>6.1}%", state.accuracy()),
            ];
            for line in &lines {
                self.centered(row, line, Color::White)?;
                row += 1;
            }
            row += 1;
        }

        if is_new_record {
            self.centered(row, "★ NEW RECORD ★", C_HIGHLIGHT)?;
            row += 1;
        }
        self.centered(row + 1, "SPACE - Menu  ESC - Quit", C_HINT)
    }

    fn finish_frame(&mut self) -> std::io::Result<()> {
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.rows.saturating_sub(1)))?;
        self.out.flush()
    }
}

fn hud_column(cols: u16, slot: PlayerSlot) -> u16 {
    match slot {
        PlayerSlot::One => 1,
        PlayerSlot::Two => cols / 2,
    }
}

fn centered<W: Write>(out: &mut W, cols: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = (cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Menu screens ──────────────────────────────────────────────────────────────

pub fn draw_title<W: Write>(
    out: &mut W,
    mode: GameMode,
    difficulty: Difficulty,
    best: Option<&Score>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (cols, rows) = terminal::size()?;
    let cy = rows / 2;

    centered(out, cols, cy.saturating_sub(6), "★  I N V A D E R S  ★", C_TITLE)?;
    if let Some(best) = best {
        centered(out, cols, cy.saturating_sub(5), &format!("Best: {} {}", best.name(), best.score()), C_HUD_SCORE)?;
    }

    let options = [
        ("1", "Play".to_string()),
        ("2", format!("Mode:       {}", mode.label())),
        ("3", format!("Difficulty: {}", difficulty.label())),
        ("4", "High scores".to_string()),
        ("Q", "Quit".to_string()),
    ];
    let left = (cols / 2).saturating_sub(12);
    for (i, (key, label)) in options.iter().enumerate() {
        out.queue(cursor::MoveTo(left, cy.saturating_sub(2) + i as u16))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(label))?;
    }

    centered(out, cols, cy + 5, "P1: ← → move, ↑ shoot   P2: A D move, W shoot", C_HINT)?;
    out.queue(style::ResetColor)?;
    out.flush()
}

pub fn draw_high_scores<W: Write>(out: &mut W, scores: &[Score]) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (cols, rows) = terminal::size()?;
    let top = (rows / 2).saturating_sub(6);

    centered(out, cols, top, "High Scores", C_TITLE)?;
    if scores.is_empty() {
        centered(out, cols, top + 2, "No records yet", C_HINT)?;
    }
    for (i, score) in scores.iter().enumerate() {
        let line = format!("{}. {}  {:>6}", i + 1, score.name(), score.score());
        centered(out, cols, top + 2 + i as u16, &line, Color::White)?;
    }
    centered(out, cols, top + 11, "SPACE - Back   DELETE - Clear records", C_HINT)?;
    out.queue(style::ResetColor)?;
    out.flush()
}

pub fn draw_name_entry<W: Write>(out: &mut W, player: usize, name: &str, score: u32) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (cols, rows) = terminal::size()?;
    let cy = rows / 2;

    centered(out, cols, cy.saturating_sub(3), "★ NEW RECORD ★", C_HIGHLIGHT)?;
    centered(out, cols, cy.saturating_sub(1), &format!("Player {player} scored {score}"), Color::White)?;
    let shown: String = format!("{:_<3}", name);
    centered(out, cols, cy + 1, &shown, C_HUD_SCORE)?;
    centered(out, cols, cy + 3, "Type 3 letters, ENTER to save", C_HINT)?;
    out.queue(style::ResetColor)?;
    out.flush()
}
