use std::{
    io::{BufRead, Write},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use scoring::ScoreKeeper;
use shared::{
    domain::{Algorithm, Level, Side, Strategy},
    protocol::RunSummary,
};
use stepper_core::{Stepper, SubmitOutcome};
use tracing::{debug, info};

/// What the player sees when a decision is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub question: &'static str,
    pub comparison: String,
    /// Ground truth. Terminal players only see it as a hint when allowed.
    pub expected: Option<Side>,
    pub hints: bool,
}

pub trait DecisionSource {
    /// `None` ends the session early.
    fn choose(&mut self, prompt: &Prompt) -> Result<Option<Side>>;
}

/// Scripted answers, for demos and unattended runs.
pub struct Autoplay {
    strategy: Strategy,
    turn: usize,
}

impl Autoplay {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy, turn: 0 }
    }
}

impl DecisionSource for Autoplay {
    fn choose(&mut self, prompt: &Prompt) -> Result<Option<Side>> {
        let side = self.strategy.pick(prompt.expected, self.turn);
        self.turn += 1;
        Ok(Some(side))
    }
}

/// Line-oriented player: `l`/`r` answer, `?` asks for a hint, `q` quits.
pub struct TerminalSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> DecisionSource for TerminalSource<R, W> {
    fn choose(&mut self, prompt: &Prompt) -> Result<Option<Side>> {
        loop {
            write!(
                self.output,
                "{} {} [l/r{}q] ",
                prompt.question,
                prompt.comparison,
                if prompt.hints { "/?/" } else { "/" }
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self
                .input
                .read_line(&mut line)
                .context("failed to read answer")?
                == 0
            {
                return Ok(None);
            }

            match line.trim() {
                "q" | "quit" => return Ok(None),
                "?" | "h" | "hint" => match prompt.expected.filter(|_| prompt.hints) {
                    Some(side) => writeln!(self.output, "hint: {side}")?,
                    None => writeln!(self.output, "no hints at this level")?,
                },
                answer => match answer.parse::<Side>() {
                    Ok(side) => return Ok(Some(side)),
                    Err(err) => writeln!(self.output, "{err}")?,
                },
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionRules {
    pub algorithm: Algorithm,
    pub level: Level,
    pub hints: bool,
    /// Allowance for each answer. A late answer ends the run unjudged.
    pub time_limit: Option<Duration>,
}

impl SessionRules {
    pub fn new(algorithm: Algorithm, level: Level, hints_override: Option<bool>) -> Self {
        let spec = level.spec();
        Self {
            algorithm,
            level,
            hints: hints_override.unwrap_or(spec.hints),
            time_limit: spec.time_limit,
        }
    }

    fn expired(&self, elapsed: Duration) -> bool {
        self.time_limit.is_some_and(|limit| elapsed >= limit)
    }

    fn question(&self) -> &'static str {
        match self.algorithm {
            Algorithm::MergeSort => "Which side goes first?",
            Algorithm::QuickSort => "Left of the pivot or right?",
            Algorithm::BinarySearch => "Which half holds the target?",
        }
    }
}

/// Plays one run to completion, timeout or quit, and scores it.
pub fn play<S, D, W>(
    stepper: &mut S,
    source: &mut D,
    rules: &SessionRules,
    out: &mut W,
) -> Result<RunSummary>
where
    S: Stepper + ?Sized,
    D: DecisionSource + ?Sized,
    W: Write + ?Sized,
{
    let mut keeper = ScoreKeeper::new(rules.algorithm, rules.level, stepper.input_len());
    let started = Instant::now();
    info!(
        algorithm = rules.algorithm.as_str(),
        level = rules.level.as_str(),
        elements = stepper.input_len(),
        "session started"
    );

    loop {
        if !stepper.awaiting_decision() {
            if !stepper.step() {
                break;
            }
            continue;
        }

        let prompt = Prompt {
            question: rules.question(),
            comparison: stepper
                .peek_comparison()
                .map(|comparison| comparison.to_string())
                .unwrap_or_default(),
            expected: stepper.expected_side(),
            hints: rules.hints,
        };
        let asked = Instant::now();
        let Some(side) = source.choose(&prompt)? else {
            info!(phase = stepper.phase_name(), "session abandoned");
            break;
        };
        let response = asked.elapsed();
        if rules.expired(response) {
            writeln!(out, "time is up")?;
            info!(?response, phase = stepper.phase_name(), "answer too late");
            break;
        }

        match stepper.submit_side(side) {
            SubmitOutcome::Judged { correct, message } => {
                let delta = keeper.record(correct, response);
                writeln!(out, "{message} ({delta:+} points, score {})", keeper.score())?;
            }
            SubmitOutcome::NotApplicable { reason } => debug!(reason, "answer ignored"),
        }
    }

    let completed = stepper.is_complete();
    let summary = keeper.finish(started.elapsed(), completed);
    info!(
        run_id = %summary.run_id,
        score = summary.score,
        completed,
        "session finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
