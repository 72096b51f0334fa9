use std::path::PathBuf;

use invaders::error::GameError;
use invaders::score::*;

fn temp_store(name: &str, max: usize) -> FileScoreStore {
    let path: PathBuf = std::env::temp_dir().join(format!("invaders-scores-{}-{}", std::process::id(), name));
    std::fs::remove_file(&path).ok();
    FileScoreStore::new(path, max)
}

fn score(name: &str, value: u32) -> Score {
    Score::new(name, value).expect("valid score")
}

// ── Records ───────────────────────────────────────────────────────────────────

#[test]
fn names_are_three_letters_upper_cased() {
    assert_eq!(score("abc", 10).name(), "ABC");
    assert!(matches!(Score::new("AB", 10), Err(GameError::InvalidName(_))));
    assert!(matches!(Score::new("ABCD", 10), Err(GameError::InvalidName(_))));
    assert!(matches!(Score::new("A1C", 10), Err(GameError::InvalidName(_))));
}

#[test]
fn best_score_sorts_first() {
    let mut scores = vec![score("AAA", 10), score("BBB", 300), score("CCC", 300), score("DDD", 50)];
    scores.sort();
    let names: Vec<&str> = scores.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["BBB", "CCC", "DDD", "AAA"]);
}

#[test]
fn display_matches_file_format() {
    assert_eq!(score("ZED", 1230).to_string(), "ZED 1230");
}

#[test]
fn qualification() {
    let board = vec![score("AAA", 300), score("BBB", 200)];
    assert!(!qualifies(&board, 0, 5));
    assert!(qualifies(&board, 10, 5));
    assert!(!qualifies(&board, 150, 2));
    assert!(qualifies(&board, 250, 2));
}

// ── File store ────────────────────────────────────────────────────────────────

#[test]
fn missing_file_is_an_empty_board() {
    let store = temp_store("missing", 7);
    assert!(store.load_high_scores().expect("load").is_empty());
}

#[test]
fn saves_sorted_and_capped() {
    let mut store = temp_store("capped", 3);
    for (name, value) in [("AAA", 100), ("BBB", 400), ("CCC", 200), ("DDD", 300)] {
        store.save(score(name, value)).expect("save");
    }
    let board = store.load_high_scores().expect("load");
    let values: Vec<u32> = board.iter().map(|s| s.score()).collect();
    assert_eq!(values, vec![400, 300, 200]);

    let text = std::fs::read_to_string(store.path()).expect("read");
    assert_eq!(text, "BBB 400\nDDD 300\nCCC 200\n");
    store.delete_all().expect("delete");
}

#[test]
fn malformed_line_reports_its_number() {
    let store = temp_store("malformed", 7);
    std::fs::write(store.path(), "AAA 100\nBBB lots\n").expect("write");
    let result = store.load_high_scores();
    std::fs::remove_file(store.path()).ok();
    assert!(matches!(result, Err(GameError::MalformedScore { line: 2, .. })));
}

#[test]
fn save_leaves_a_corrupt_board_alone() {
    let mut store = temp_store("corrupt", 7);
    let before = "AAA 500\nBBB 400\nthis line is broken\n";
    std::fs::write(store.path(), before).expect("write");
    let result = store.save(score("ZZZ", 10));
    let after = std::fs::read_to_string(store.path()).expect("read");
    std::fs::remove_file(store.path()).ok();
    assert!(matches!(result, Err(GameError::MalformedScore { line: 3, .. })));
    assert_eq!(after, before);
}

#[test]
fn blank_lines_are_skipped() {
    let store = temp_store("blank", 7);
    std::fs::write(store.path(), "\nAAA 100\n\n").expect("write");
    let board = store.load_high_scores().expect("load");
    std::fs::remove_file(store.path()).ok();
    assert_eq!(board, vec![score("AAA", 100)]);
}

#[test]
fn unreadable_board_loads_empty() {
    let store = temp_store("unreadable", 7);
    std::fs::write(store.path(), "garbage").expect("write");
    assert!(load_or_empty(&store).is_empty());
    std::fs::remove_file(store.path()).ok();
}

#[test]
fn delete_all_is_idempotent() {
    let mut store = temp_store("delete", 7);
    store.save(score("AAA", 100)).expect("save");
    store.delete_all().expect("delete");
    assert!(store.load_high_scores().expect("load").is_empty());
    store.delete_all().expect("delete again");
}
