mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{info, warn};
use rand::rngs::ThreadRng;
use rand::thread_rng;
use smallvec::SmallVec;

use invaders::compute::{GameScreen, ScreenConfig};
use invaders::entities::GameState;
use invaders::error::GameError;
use invaders::input::{HeldKeys, Key};
use invaders::render::Renderer;
use invaders::score::{load_or_empty, qualifies, FileScoreStore, Score, ScoreStore};
use invaders::settings::{Difficulty, GameConfig, GameMode};

use display::{SpriteAtlas, TerminalRenderer};

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key counts as "held" if its last press/repeat event arrived within this
/// window.  Covers terminals that don't emit key-release events: the OS
/// key-repeat rate is ≥ 15 Hz, so the window is always refreshed before it
/// expires while the key is down.
const HOLD_WINDOW: Duration = Duration::from_millis(133);

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::A),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::D),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::W),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Delete => Some(Key::Delete),
        _ => None,
    }
}

/// Maps each held key → the moment it was last seen (press or repeat).
#[derive(Default)]
struct TerminalInput {
    last_seen: HashMap<Key, Instant>,
}

impl TerminalInput {
    fn seen(&mut self, key: Key, at: Instant) {
        self.last_seen.insert(key, at);
    }

    fn released(&mut self, key: Key) {
        self.last_seen.remove(&key);
    }

    fn snapshot(&self, now: Instant) -> HeldKeys {
        let mut held = HeldKeys::new();
        for (key, at) in &self.last_seen {
            if now.saturating_duration_since(*at) <= HOLD_WINDOW {
                held.press(*key);
            }
        }
        held
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
}

/// Block until the next key press.
fn wait_key(rx: &mpsc::Receiver<Event>) -> Option<(KeyCode, KeyModifiers)> {
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. })) => {
                return Some((code, modifiers));
            }
            Ok(_) => {}
            Err(_) => return None,
        }
    }
}

// ── Menu flow ─────────────────────────────────────────────────────────────────

enum Screen {
    Title,
    Play,
    HighScores,
    Exit,
}

struct Session<'a> {
    config: &'a GameConfig,
    atlas: SpriteAtlas,
    store: FileScoreStore,
    mode: GameMode,
    difficulty: Difficulty,
    rng: ThreadRng,
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, config: &GameConfig) -> Result<(), GameError> {
    let atlas = SpriteAtlas::terminal();
    atlas.validate()?;

    let mut session = Session {
        config,
        atlas,
        store: FileScoreStore::new(&config.high_score_file, config.max_high_scores),
        mode: GameMode::SinglePlayer,
        difficulty: Difficulty::Easy,
        rng: thread_rng(),
    };

    let mut screen = Screen::Title;
    loop {
        screen = match screen {
            Screen::Title => title(out, rx, &mut session)?,
            Screen::Play => match play(out, rx, &mut session)? {
                Some(states) => results(out, rx, &mut session, &states)?,
                None => Screen::Exit,
            },
            Screen::HighScores => high_scores(out, rx, &mut session)?,
            Screen::Exit => break,
        };
    }
    Ok(())
}

fn title<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, session: &mut Session) -> Result<Screen, GameError> {
    loop {
        let scores = load_or_empty(&session.store);
        display::draw_title(out, session.mode, session.difficulty, scores.first())?;
        let Some((code, modifiers)) = wait_key(rx) else {
            return Ok(Screen::Exit);
        };
        match code {
            KeyCode::Char('1') | KeyCode::Enter => return Ok(Screen::Play),
            KeyCode::Char('2') => {
                session.mode = session.mode.toggle();
                info!("Game mode set to {:?}", session.mode);
            }
            KeyCode::Char('3') => {
                session.difficulty = session.difficulty.next();
                info!("Difficulty set to {:?}", session.difficulty);
            }
            KeyCode::Char('4') => return Ok(Screen::HighScores),
            _ if is_quit(code, modifiers) => return Ok(Screen::Exit),
            _ => {}
        }
    }
}

fn high_scores<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut Session,
) -> Result<Screen, GameError> {
    let scores = load_or_empty(&session.store);
    display::draw_high_scores(out, &scores)?;
    loop {
        let Some((code, modifiers)) = wait_key(rx) else {
            return Ok(Screen::Exit);
        };
        match code {
            KeyCode::Char(' ') => return Ok(Screen::Title),
            KeyCode::Delete => {
                if let Err(e) = session.store.delete_all() {
                    warn!("Couldn't delete high scores: {e}");
                }
                return Ok(Screen::Title);
            }
            _ if is_quit(code, modifiers) => return Ok(Screen::Exit),
            _ => {}
        }
    }
}

/// Play levels until every player is out of lives or the last level is
/// cleared.  Returns `None` if the player quit mid-game.
fn play<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut Session,
) -> Result<Option<SmallVec<[GameState; 2]>>, GameError> {
    let config = session.config;
    let table = session.difficulty.level_table();
    let screen_config = ScreenConfig::from(config);
    let mut states: SmallVec<[GameState; 2]> = (0..session.mode.player_count())
        .map(|_| GameState::initial(config.max_lives))
        .collect();

    let last_level = config.num_levels.min(table.len() as u32);
    while states.iter().any(GameState::is_alive) && states[0].level <= last_level {
        let level = states[0].level;
        let settings = table.settings_for(level)?;
        let bonus_life = config.is_bonus_life_level(level);

        let mut screen = GameScreen::new(&states, &settings, session.mode, bonus_life, screen_config, &mut session.rng)?;
        info!(
            "Starting {}x{} game screen, level {} at {} fps.",
            config.width, config.height, level, config.fps
        );
        if !level_loop(out, rx, &mut screen, session)? {
            return Ok(None);
        }
        info!("Closing game screen.");
        states = screen.game_states().iter().map(GameState::next_level).collect();
    }

    for (i, s) in states.iter().enumerate() {
        info!(
            "Player {} finished with a score of {}, {} lives remaining, {} bullets shot and {} ships destroyed.",
            i + 1,
            s.score,
            s.lives_remaining,
            s.bullets_shot,
            s.ships_destroyed
        );
    }
    Ok(Some(states))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `false` → quit program, `true` → level finished.
///
/// Input model: instead of acting on each key event individually, we keep the
/// moment each key was last pressed or repeated and hand the simulation a
/// snapshot of every key still considered held.  This allows shooting and
/// moving at the same time, and two players sharing one keyboard.
fn level_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    screen: &mut GameScreen,
    session: &mut Session,
) -> Result<bool, GameError> {
    let frame = session.config.frame_duration();
    let mut input = TerminalInput::default();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            if kind == KeyEventKind::Press && is_quit(code, modifiers) {
                return Ok(false);
            }
            let Some(key) = map_key(code) else {
                continue;
            };
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => input.seen(key, frame_start),
                KeyEventKind::Release => input.released(key),
            }
        }

        let elapsed = frame_start.duration_since(last_tick);
        last_tick = frame_start;
        screen.tick(elapsed, &input.snapshot(frame_start), &mut session.rng);

        let mut renderer = TerminalRenderer::new(out, &session.atlas, session.config.playfield())?;
        screen.draw(&mut renderer)?;

        if screen.is_done() {
            return Ok(true);
        }

        let spent = frame_start.elapsed();
        if spent < frame {
            thread::sleep(frame - spent);
        }
    }
}

// ── Results & name entry ──────────────────────────────────────────────────────

fn results<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &mut Session,
    states: &[GameState],
) -> Result<Screen, GameError> {
    let board = load_or_empty(&session.store);
    let max = session.config.max_high_scores;
    let records: Vec<(usize, u32)> = states
        .iter()
        .enumerate()
        .filter(|(_, s)| qualifies(&board, s.score, max))
        .map(|(i, s)| (i + 1, s.score))
        .collect();

    let mut renderer = TerminalRenderer::new(out, &session.atlas, session.config.playfield())?;
    renderer.draw_results(states, !records.is_empty())?;
    renderer.finish_frame()?;

    loop {
        let Some((code, modifiers)) = wait_key(rx) else {
            return Ok(Screen::Exit);
        };
        match code {
            KeyCode::Char(' ') | KeyCode::Enter => break,
            _ if is_quit(code, modifiers) => return Ok(Screen::Exit),
            _ => {}
        }
    }

    for (player, score) in records {
        let Some(name) = name_entry(out, rx, player, score)? else {
            continue;
        };
        if let Err(e) = Score::new(&name, score).and_then(|s| session.store.save(s)) {
            warn!("Couldn't save high score: {e}");
        }
    }
    Ok(Screen::Title)
}

fn name_entry<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    player: usize,
    score: u32,
) -> Result<Option<String>, GameError> {
    let mut name = String::new();
    loop {
        display::draw_name_entry(out, player, &name, score)?;
        let Some((code, _)) = wait_key(rx) else {
            return Ok(None);
        };
        match code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() && name.len() < 3 => {
                name.push(c.to_ascii_uppercase());
            }
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Enter if name.len() == 3 => return Ok(Some(name)),
            KeyCode::Esc => return Ok(None),
            _ => {}
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(config: &GameConfig) {
    match File::create(&config.log_file) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("logging disabled: cannot open {}: {e}", config.log_file.display()),
    }
}

fn main() -> Result<(), GameError> {
    let (config, config_warning) = GameConfig::load_or_default(GameConfig::default_path());
    init_logging(&config);
    if let Some(warning) = config_warning {
        warn!("Using default configuration: {warning}");
    }

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        warn!("Exiting with error: {e}");
    }
    result
}
