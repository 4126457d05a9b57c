use chrono::{TimeZone, Utc};
use shared::domain::{Algorithm, RunId};

use super::*;

fn run(level: Level, score: u64, completed: bool) -> RunSummary {
    RunSummary {
        run_id: RunId::new(),
        algorithm: Algorithm::MergeSort,
        level,
        elements: level.spec().elements,
        elapsed_secs: 20.0,
        correct: 3,
        incorrect: 1,
        score,
        recorded_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        completed,
    }
}

#[test]
fn missing_file_is_empty_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RunStore::open_in(dir.path()).expect("open");
    assert!(store.history().is_empty());
    assert_eq!(store.path(), dir.path().join(DEFAULT_FILE_NAME));
    assert!(!store.path().exists());
}

#[test]
fn append_persists_and_reloads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("history.json");

    let mut store = RunStore::open(&path).expect("open");
    let first = run(Level::Easy, 1200, true);
    store.append(first.clone()).expect("append");
    store.append(run(Level::Hard, 300, false)).expect("append");

    let reopened = RunStore::open(&path).expect("reopen");
    assert_eq!(reopened.history().len(), 2);
    assert_eq!(reopened.history()[0], first);

    let raw = std::fs::read_to_string(&path).expect("read");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["history"][1]["level"], "hard");
    assert_eq!(json["history"][0]["recorded_at"], "2026-03-01T12:00:00Z");
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_FILE_NAME);
    std::fs::write(&path, "{ not json").expect("write");

    let err = RunStore::open(&path).expect_err("corrupt");
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert_eq!(err.code(), ErrorCode::Storage);
}

#[test]
fn document_without_history_key_loads_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_FILE_NAME);
    std::fs::write(&path, "{}").expect("write");
    assert!(RunStore::open(&path).expect("open").history().is_empty());
}

#[test]
fn ranking_lists_completed_runs_by_score() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = RunStore::open_in(dir.path()).expect("open");
    for (score, completed) in [(400, true), (9000, false), (1500, true), (800, true)] {
        store.append(run(Level::Medium, score, completed)).expect("append");
    }

    let scores: Vec<u64> = store.ranking(10).iter().map(|run| run.score).collect();
    assert_eq!(scores, vec![1500, 800, 400]);
    assert_eq!(store.ranking(2).len(), 2);
    assert!(store.ranking(0).is_empty());
}

#[test]
fn overall_stats_aggregate_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = RunStore::open_in(dir.path()).expect("open");

    let mut slow = run(Level::Hard, 2000, true);
    slow.elapsed_secs = 40.0;
    slow.incorrect = 0;
    store.append(run(Level::Easy, 500, true)).expect("append");
    store.append(slow).expect("append");
    store.append(run(Level::Hard, 9000, false)).expect("append");
    store.append(run(Level::Easy, 100, false)).expect("append");

    let stats = store.overall_stats();
    assert_eq!(stats.total_runs, 4);
    assert_eq!(stats.completed_runs, 2);
    assert_eq!(stats.best_score, 9000);
    assert_eq!(stats.mean_precision, 81.25);
    assert_eq!(stats.mean_completion_secs, 30.0);
    assert_eq!(stats.favourite_level, Level::Easy);
    assert_eq!(stats.completion_rate, 50.0);
}

#[test]
fn empty_history_stats_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RunStore::open_in(dir.path()).expect("open");
    let stats = store.overall_stats();
    assert_eq!(stats.total_runs, 0);
    assert_eq!(stats.best_score, 0);
    assert_eq!(stats.mean_precision, 0.0);
    assert_eq!(stats.favourite_level, Level::Easy);
    assert_eq!(stats.completion_rate, 0.0);
}

#[test]
fn favourite_level_prefers_most_played() {
    let history = vec![
        run(Level::Easy, 1, true),
        run(Level::Expert, 1, true),
        run(Level::Expert, 1, true),
    ];
    assert_eq!(favourite_level(&history), Level::Expert);
}

#[test]
fn reset_clears_file_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = RunStore::open_in(dir.path()).expect("open");
    store.append(run(Level::Easy, 100, true)).expect("append");
    store.reset().expect("reset");

    assert!(store.history().is_empty());
    let reopened = RunStore::open_in(dir.path()).expect("reopen");
    assert!(reopened.history().is_empty());
}

#[test]
fn failed_append_leaves_history_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = RunStore::open_in(dir.path()).expect("open");
    std::fs::create_dir(store.path().with_extension("json.tmp")).expect("block staging file");

    let err = store
        .append(run(Level::Easy, 900, true))
        .expect_err("staging path is a directory");
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(store.history().is_empty());
    assert!(store.ranking(10).is_empty());

    let reopened = RunStore::open_in(dir.path()).expect("reopen");
    assert!(reopened.history().is_empty());
}
