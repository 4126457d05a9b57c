use std::{cell::RefCell, cmp::Ordering, rc::Rc};

use super::*;
use crate::{always_correct, always_wrong, run_to_completion};

#[derive(Debug, Clone)]
struct Card {
    rank: u8,
    tag: char,
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
    }
}

impl Eq for Card {}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank.cmp(&other.rank)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.tag)
    }
}

fn recorded_events(
    input: &[i64],
) -> (MergeStepper<i64>, Rc<RefCell<Vec<VisualEvent<i64>>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink_events = Rc::clone(&events);
    let stepper = MergeStepper::with_sink(input, move |event: &VisualEvent<i64>| {
        sink_events.borrow_mut().push(event.clone());
    });
    (stepper, events)
}

#[test]
fn sorts_four_elements_in_three_fusions() {
    let mut stepper = MergeStepper::new(&[5, 3, 8, 1]);
    run_to_completion(&mut stepper, always_correct);

    assert_eq!(stepper.final_result(), Some(vec![1, 3, 5, 8]));
    let stats = stepper.statistics();
    // one comparison for each singleton pair, three for [3, 5] with [1, 8]
    assert_eq!(stats.comparisons, 5);
    assert_eq!(stats.correct_decisions, 5);
    assert_eq!(stats.precision, 100.0);
    assert_eq!(stats.fusions, 3);
    assert_eq!(stats.level, 2);
    assert_eq!(stats.phase, MergePhase::Done);
    assert!(stats.complete);
    assert_eq!(stats.progress, 100.0);
}

#[test]
fn wrong_choices_are_scored_but_never_applied() {
    let mut stepper = MergeStepper::new(&[5, 3, 8, 1]);
    let outcomes = run_to_completion(&mut stepper, always_wrong);

    assert!(outcomes.iter().all(|outcome| !outcome.is_correct()));
    assert_eq!(stepper.final_result(), Some(vec![1, 3, 5, 8]));
    assert_eq!(stepper.statistics().precision, 0.0);
    assert!(outcomes[0].message().starts_with("Oops! 3 comes before 5"));
}

#[test]
fn ties_go_to_the_left_run() {
    let input = [
        Card { rank: 2, tag: 'a' },
        Card { rank: 1, tag: 'b' },
        Card { rank: 2, tag: 'c' },
        Card { rank: 1, tag: 'd' },
    ];
    let mut stepper = MergeStepper::new(&input);
    run_to_completion(&mut stepper, always_correct);

    let tags: String = stepper
        .final_result()
        .expect("sorted")
        .iter()
        .map(|card| card.tag)
        .collect();
    assert_eq!(tags, "bdac");
}

#[test]
fn equal_heads_expect_left() {
    let mut stepper = MergeStepper::new(&[7, 7]);
    stepper.step();
    stepper.step();
    stepper.step();
    assert_eq!(stepper.expected_side(), Some(Side::Left));

    let outcome = stepper.submit_choice(false);
    assert!(!outcome.is_correct());
    assert_eq!(stepper.decisions()[0].expected, Side::Left);
    assert_eq!(stepper.decisions()[0].answer, Side::Right);
}

#[test]
fn odd_trailing_run_is_carried_to_next_level() {
    let mut stepper = MergeStepper::new(&[3, 1, 2]);
    stepper.step();
    stepper.step();
    stepper.step();
    assert_eq!(stepper.phase(), MergePhase::Fuse);
    stepper.submit_choice(false);

    assert_eq!(stepper.sublists(), &[vec![1, 3], vec![2]]);
    assert_eq!(stepper.phase(), MergePhase::Conquer);

    // no pair left at level 0: the lone [2] moves up untouched
    assert!(stepper.step());
    assert_eq!(stepper.level(), 1);
    assert_eq!(stepper.sublists(), &[vec![1, 3], vec![2]]);

    run_to_completion(&mut stepper, always_correct);
    assert_eq!(stepper.final_result(), Some(vec![1, 2, 3]));
}

#[test]
fn submit_outside_fusion_is_not_applicable() {
    let mut stepper = MergeStepper::new(&[2, 1]);
    let outcome = stepper.submit_choice(true);
    assert!(matches!(outcome, SubmitOutcome::NotApplicable { .. }));
    assert_eq!(stepper.phase(), MergePhase::Init);
    assert!(stepper.decisions().is_empty());

    run_to_completion(&mut stepper, always_correct);
    let outcome = stepper.submit_choice(true);
    assert!(!outcome.is_applicable());
    assert_eq!(stepper.statistics().comparisons, 1);
}

#[test]
fn peek_is_idempotent_and_matches_the_next_judgement() {
    let mut stepper = MergeStepper::new(&[9, 4]);
    assert_eq!(stepper.peek_next_comparison(), None);
    stepper.step();
    stepper.step();
    stepper.step();

    let first = stepper.peek_next_comparison();
    assert_eq!(first, stepper.peek_next_comparison());
    assert_eq!(first, Some(MergeComparison { left: 9, right: 4 }));
    assert_eq!(first.map(|c| c.to_string()), Some("left 9 | right 4".into()));

    stepper.submit_choice(false);
    assert_eq!(stepper.peek_next_comparison(), None);
}

#[test]
fn fuse_step_is_a_no_op_while_waiting() {
    let mut stepper = MergeStepper::new(&[2, 1]);
    stepper.step();
    stepper.step();
    stepper.step();
    let before = stepper.statistics();
    assert!(stepper.step());
    assert_eq!(stepper.statistics(), before);
    assert_eq!(stepper.partial_fusion(), Some(&[][..]));
}

#[test]
fn restart_replays_identically() {
    let answers = [true, false, false, true, true];
    let play = |stepper: &mut MergeStepper<i64>| {
        let mut answers = answers.iter().cycle();
        run_to_completion(stepper, |_| Side::from_left(*answers.next().expect("cycle")));
        (stepper.statistics(), stepper.final_result())
    };

    let mut stepper = MergeStepper::new(&[6, 2, 9, 4, 1]);
    let first = play(&mut stepper);
    stepper.restart();
    assert_eq!(stepper.phase(), MergePhase::Init);
    assert!(stepper.decisions().is_empty());
    assert!(stepper.history().is_empty());
    let second = play(&mut stepper);

    assert_eq!(first, second);
}

#[test]
fn input_is_not_aliased_with_the_caller() {
    let mut values = vec![3, 2, 1];
    let mut stepper = MergeStepper::new(&values);
    values[0] = 100;
    run_to_completion(&mut stepper, always_correct);
    assert_eq!(stepper.input(), &[3, 2, 1]);
    assert_eq!(stepper.final_result(), Some(vec![1, 2, 3]));
}

#[test]
fn empty_and_single_inputs_complete_without_decisions() {
    let mut empty = MergeStepper::<i64>::new(&[]);
    assert!(!empty.is_complete());
    assert!(empty.step());
    assert!(!empty.step());
    assert_eq!(empty.phase(), MergePhase::Done);
    assert_eq!(empty.final_result(), Some(Vec::new()));

    let mut single = MergeStepper::new(&[42]);
    let outcomes = run_to_completion(&mut single, always_correct);
    assert!(outcomes.is_empty());
    assert_eq!(single.final_result(), Some(vec![42]));
    assert_eq!(single.statistics().precision, 0.0);
}

#[test]
fn history_tracks_division_and_every_fusion() {
    let mut stepper = MergeStepper::new(&[5, 3, 8, 1]);
    run_to_completion(&mut stepper, always_correct);

    let history = stepper.history();
    assert_eq!(history.len(), 4);
    assert!(matches!(
        &history[0],
        MergeHistory::Division { level: 0, sublists } if sublists.len() == 4
    ));
    assert_eq!(
        history[3],
        MergeHistory::Fusion {
            level: 1,
            left: vec![3, 5],
            right: vec![1, 8],
            merged: vec![1, 3, 5, 8],
        }
    );
    let rounds: Vec<usize> = stepper.decisions().iter().map(|d| d.round).collect();
    assert_eq!(rounds, vec![0, 0, 1, 1, 1]);
}

#[test]
fn progress_tracks_remaining_sublists() {
    let mut stepper = MergeStepper::new(&[5, 3, 8, 1, 7]);
    assert_eq!(stepper.progress(), 0.0);
    stepper.step();
    assert_eq!(stepper.progress(), 0.0);
    stepper.step();
    stepper.step();
    stepper.submit_choice(false);
    assert_eq!(stepper.statistics().remaining_sublists, 4);
    assert_eq!(stepper.progress(), 25.0);
    assert_eq!(stepper.statistics().remaining_elements, 5);
}

#[test]
fn sink_observes_transitions_in_order() {
    let (mut stepper, events) = recorded_events(&[5, 3, 8, 1]);
    run_to_completion(&mut stepper, always_correct);

    let names: Vec<&str> = events.borrow().iter().map(VisualEvent::name).collect();
    assert_eq!(
        names,
        vec![
            "division_initial",
            "fusion_started",
            "choice_made",
            "fusion_completed",
            "fusion_started",
            "choice_made",
            "fusion_completed",
            "level_advanced",
            "fusion_started",
            "choice_made",
            "choice_made",
            "choice_made",
            "fusion_completed",
            "sort_completed",
        ]
    );
    assert_eq!(
        events.borrow().last(),
        Some(&VisualEvent::SortCompleted {
            result: vec![1, 3, 5, 8]
        })
    );
}

#[test]
fn restart_keeps_the_registered_sink() {
    let (mut stepper, events) = recorded_events(&[2, 1]);
    run_to_completion(&mut stepper, always_correct);
    let first_run = events.borrow().len();

    stepper.restart();
    run_to_completion(&mut stepper, always_correct);
    assert_eq!(events.borrow().len(), first_run * 2);
}
