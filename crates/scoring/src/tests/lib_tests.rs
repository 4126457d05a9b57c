use super::*;

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value)
}

#[test]
fn correct_decisions_add_response_and_streak_bonuses() {
    let mut keeper = ScoreKeeper::new(Algorithm::MergeSort, Level::Easy, 4);

    assert_eq!(keeper.record_correct(secs(1.0)), 300);
    assert_eq!(keeper.record_correct(Duration::ZERO), 300);
    assert_eq!(keeper.record_correct(secs(2.5)), 425);
    assert_eq!(keeper.score(), 1025);
    assert_eq!(keeper.streak(), 3);
}

#[test]
fn slow_answers_earn_no_speed_bonus() {
    let mut keeper = ScoreKeeper::new(Algorithm::QuickSort, Level::Easy, 4);
    assert_eq!(keeper.record_correct(secs(7.0)), 200);
}

#[test]
fn level_multiplier_scales_points() {
    let mut keeper = ScoreKeeper::new(Algorithm::BinarySearch, Level::Medium, 6);
    assert_eq!(keeper.record_correct(secs(1.0)), 450);

    let mut expert = ScoreKeeper::new(Algorithm::BinarySearch, Level::Expert, 12);
    assert_eq!(expert.record_correct(secs(1.0)), 900);
}

#[test]
fn streak_bonus_is_capped() {
    let mut keeper = ScoreKeeper::new(Algorithm::MergeSort, Level::Easy, 4);
    let awards: Vec<u64> = (0..12)
        .map(|_| keeper.record_correct(Duration::ZERO))
        .collect();

    assert_eq!(awards[0], 200);
    assert_eq!(awards[9], 1100);
    assert_eq!(awards[11], 1100);
    assert_eq!(keeper.best_streak(), 12);
}

#[test]
fn wrong_decision_applies_penalty_and_resets_streak() {
    let mut keeper = ScoreKeeper::new(Algorithm::MergeSort, Level::Easy, 4);
    keeper.record_correct(secs(1.0));
    keeper.record_correct(Duration::ZERO);

    assert_eq!(keeper.record_wrong(), 60);
    assert_eq!(keeper.score(), 540);
    assert_eq!(keeper.streak(), 0);
    assert_eq!(keeper.best_streak(), 2);

    assert_eq!(keeper.record_correct(Duration::ZERO), 200);
    assert_eq!(keeper.incorrect(), 1);
    assert_eq!(keeper.correct(), 3);
}

#[test]
fn penalty_is_capped_and_score_never_negative() {
    let mut keeper = ScoreKeeper::new(Algorithm::QuickSort, Level::Expert, 12);
    assert_eq!(keeper.record_wrong(), 0);
    assert_eq!(keeper.score(), 0);

    for _ in 0..10 {
        keeper.record_correct(Duration::ZERO);
    }
    assert_eq!(keeper.record_wrong(), MAX_PENALTY);
}

#[test]
fn signed_record_reports_gain_or_loss() {
    let mut keeper = ScoreKeeper::new(Algorithm::MergeSort, Level::Easy, 4);
    assert_eq!(keeper.record(true, Duration::ZERO), 200);
    assert_eq!(keeper.record(false, Duration::ZERO), -20);
}

#[test]
fn completion_bonus_for_imperfect_easy_run() {
    let mut keeper = ScoreKeeper::new(Algorithm::MergeSort, Level::Easy, 4);
    keeper.record_correct(Duration::ZERO);
    keeper.record_wrong();

    let bonus = keeper.completion_bonus(secs(10.0));
    assert_eq!(
        bonus,
        CompletionBonus {
            completion: 500,
            perfect: 0,
            time: 666,
        }
    );
}

#[test]
fn perfect_hard_run_collects_every_bonus() {
    let mut keeper = ScoreKeeper::new(Algorithm::QuickSort, Level::Hard, 8);
    keeper.record_correct(Duration::ZERO);
    let before = keeper.score();

    let summary = keeper.finish(secs(15.0), true);
    assert_eq!(summary.score, before + 1000 + 2000 + 750);
    assert!(summary.completed);
    assert_eq!(summary.level, Level::Hard);
    assert_eq!(summary.elements, 8);
    assert_eq!(summary.correct, 1);
}

#[test]
fn slow_completion_gets_no_time_bonus() {
    let keeper = ScoreKeeper::new(Algorithm::BinarySearch, Level::Medium, 6);
    assert_eq!(keeper.completion_bonus(secs(45.0)).time, 0);
    assert_eq!(keeper.completion_bonus(secs(45.0)).completion, 750);
}

#[test]
fn incomplete_run_keeps_raw_score() {
    let mut keeper = ScoreKeeper::new(Algorithm::MergeSort, Level::Medium, 6);
    keeper.record_correct(Duration::ZERO);
    keeper.record_wrong();
    let score = keeper.score();

    let recorded_at = Utc::now();
    let summary = keeper.finish_at(secs(31.0), false, recorded_at);
    assert_eq!(summary.score, score);
    assert!(!summary.completed);
    assert_eq!(summary.recorded_at, recorded_at);
    assert_eq!(summary.elapsed_secs, 31.0);
    assert_eq!(summary.precision(), 50.0);
}

#[test]
fn completion_bonus_serializes_as_breakdown() {
    let json = serde_json::to_value(CompletionBonus {
        completion: 500,
        perfect: 2000,
        time: 100,
    })
    .expect("serialize");
    assert_eq!(json["perfect"], 2000);
}
