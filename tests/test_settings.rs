use std::path::PathBuf;
use std::time::Duration;

use invaders::error::GameError;
use invaders::settings::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("invaders-settings-{}-{}", std::process::id(), name))
}

// ── Level tables ──────────────────────────────────────────────────────────────

#[test]
fn every_difficulty_has_seven_levels() {
    for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
        let table = difficulty.level_table();
        assert_eq!(table.len(), 7, "{}", difficulty.label());
        assert!(table.settings_for(7).is_ok());
    }
}

#[test]
fn first_easy_level() {
    let settings = Difficulty::Easy.level_table().settings_for(1).expect("level 1");
    assert_eq!(settings, LevelSettings::new(3, 2, 60, 2000));
}

#[test]
fn later_levels_get_harder() {
    let table = Difficulty::Normal.level_table();
    let first = table.settings_for(1).expect("level 1");
    let last = table.settings_for(7).expect("level 7");
    assert!(last.formation_width * last.formation_height > first.formation_width * first.formation_height);
    assert!(last.base_speed < first.base_speed);
    assert!(last.shooting_frequency < first.shooting_frequency);
}

#[test]
fn unknown_levels_are_errors() {
    let table = Difficulty::Hard.level_table();
    assert!(matches!(table.settings_for(0), Err(GameError::UnknownLevel { level: 0, available: 7 })));
    assert!(matches!(table.settings_for(8), Err(GameError::UnknownLevel { level: 8, .. })));
    assert!(LevelTable::new(Vec::new()).is_empty());
}

#[test]
fn difficulty_and_mode_cycle() {
    assert_eq!(Difficulty::Easy.next(), Difficulty::Normal);
    assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
    assert_eq!(GameMode::SinglePlayer.toggle(), GameMode::TwoPlayer);
    assert_eq!(GameMode::TwoPlayer.toggle().player_count(), 1);
}

// ── Config file ───────────────────────────────────────────────────────────────

#[test]
fn defaults() {
    let config = GameConfig::default();
    assert_eq!(config.playfield(), Playfield { width: 500, height: 680 });
    assert_eq!(config.max_lives, 3);
    assert_eq!(config.num_levels, 7);
    assert_eq!(config.max_high_scores, 7);
    assert_eq!(config.frame_duration(), Duration::from_secs(1) / 60);
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let config = GameConfig::from_toml("fps = 30\nmax_lives = 5\n").expect("valid toml");
    assert_eq!(config.fps, 30);
    assert_eq!(config.max_lives, 5);
    assert_eq!(config.width, 500);
    assert_eq!(config.input_delay_ms, 6000);
}

#[test]
fn bad_toml_is_a_parse_error() {
    assert!(matches!(GameConfig::from_toml("fps = \"fast\""), Err(GameError::ConfigParse(_))));
}

#[test]
fn missing_file_falls_back_silently() {
    let (config, warning) = GameConfig::load_or_default(temp_path("missing.toml"));
    assert_eq!(config, GameConfig::default());
    assert!(warning.is_none());
}

#[test]
fn broken_file_falls_back_with_warning() {
    let path = temp_path("broken.toml");
    std::fs::write(&path, "width = [").expect("write config");
    let (config, warning) = GameConfig::load_or_default(&path);
    std::fs::remove_file(&path).ok();
    assert_eq!(config, GameConfig::default());
    assert!(warning.is_some());
}

#[test]
fn file_is_loaded() {
    let path = temp_path("good.toml");
    std::fs::write(&path, "width = 640\nheight = 480\n").expect("write config");
    let (config, warning) = GameConfig::load_or_default(&path);
    std::fs::remove_file(&path).ok();
    assert!(warning.is_none());
    assert_eq!(config.playfield(), Playfield { width: 640, height: 480 });
}

#[test]
fn bonus_life_every_third_level() {
    let config = GameConfig::default();
    let levels: Vec<u32> = (1..=7).filter(|&l| config.is_bonus_life_level(l)).collect();
    assert_eq!(levels, vec![3, 6]);

    let never = GameConfig { extra_life_frequency: 0, ..GameConfig::default() };
    assert!(!(1..=7).any(|l| never.is_bonus_life_level(l)));
}
