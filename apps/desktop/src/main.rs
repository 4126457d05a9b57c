use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use shared::{
    domain::{parse_values, Algorithm, Level, Strategy},
    protocol::{RunSummary, VisualEvent},
};
use stepper_core::{MergeStepper, QuickStepper, SearchStepper, Stepper};
use storage::RunStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;
mod session;

use config::load_settings;
use session::{play, Autoplay, DecisionSource, SessionRules, TerminalSource};

#[derive(Parser, Debug)]
#[command(about = "Drive merge sort, quick sort or binary search one decision at a time")]
struct Args {
    #[arg(long)]
    algorithm: Option<Algorithm>,
    #[arg(long)]
    level: Option<Level>,
    /// Comma separated values; random distinct values when omitted.
    #[arg(long)]
    values: Option<String>,
    /// Binary search target.
    #[arg(long)]
    target: Option<i64>,
    /// Pick a search target that is not among the values.
    #[arg(long)]
    absent: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// Answer automatically with the given strategy instead of reading stdin.
    #[arg(long)]
    autoplay: Option<Strategy>,
    #[arg(long)]
    no_save: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let settings = load_settings();
    let algorithm = args.algorithm.unwrap_or(settings.algorithm);
    let level = args.level.unwrap_or(settings.level);
    let range = (settings.min_value, settings.max_value);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let values = match args.values.as_deref() {
        Some(raw) => parse_values(raw).context("invalid --values")?,
        None => input::random_values(&mut rng, level.spec().elements, range.0, range.1)
            .context("cannot generate input values")?,
    };
    let puzzle = input::prepare(&mut rng, algorithm, values, args.target, args.absent, range);
    let rules = SessionRules::new(algorithm, level, settings.hints);

    let mut source: Box<dyn DecisionSource> = match args.autoplay {
        Some(strategy) => Box::new(Autoplay::new(strategy)),
        None => Box::new(TerminalSource::new(io::stdin().lock(), io::stdout())),
    };

    let summary = match algorithm {
        Algorithm::MergeSort => run(
            MergeStepper::with_sink(&puzzle.values, print_event),
            source.as_mut(),
            &rules,
        )?,
        Algorithm::QuickSort => run(
            QuickStepper::with_sink(&puzzle.values, print_event),
            source.as_mut(),
            &rules,
        )?,
        Algorithm::BinarySearch => {
            let target = puzzle.target.context("binary search needs a target")?;
            run(
                SearchStepper::with_sink(&puzzle.values, target, print_event),
                source.as_mut(),
                &rules,
            )?
        }
    };

    println!(
        "score {} | {} correct, {} wrong | precision {:.2}% | {:.1}s{}",
        summary.score,
        summary.correct,
        summary.incorrect,
        summary.precision(),
        summary.elapsed_secs,
        if summary.completed { "" } else { " | incomplete" }
    );

    if args.no_save {
        return Ok(());
    }
    let mut store = RunStore::open_in(&settings.data_dir).with_context(|| {
        format!(
            "failed to open run history in '{}'",
            settings.data_dir.display()
        )
    })?;
    store.append(summary).context("failed to record run")?;
    info!(path = %store.path().display(), runs = store.history().len(), "run saved");

    Ok(())
}

fn run<S>(
    mut stepper: S,
    source: &mut dyn DecisionSource,
    rules: &SessionRules,
) -> Result<RunSummary>
where
    S: Stepper,
    S::Outcome: Serialize,
{
    let mut stdout = io::stdout();
    let summary = play(&mut stepper, source, rules, &mut stdout)?;
    if let Some(outcome) = stepper.outcome() {
        writeln!(stdout, "result: {}", serde_json::to_string(&outcome)?)?;
    }
    Ok(summary)
}

fn print_event(event: &VisualEvent<i64>) {
    if let Some(line) = render::describe(event) {
        println!("  {line}");
    }
}
