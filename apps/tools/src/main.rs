use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use shared::domain::{parse_values, Algorithm, Strategy};
use stepper_core::{run_to_completion, scripted, MergeStepper, QuickStepper, SearchStepper};
use storage::RunStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Best completed runs.
    Ranking {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    Stats,
    Reset,
    /// Runs a stepper with scripted answers and prints its statistics.
    Simulate {
        algorithm: Algorithm,
        values: String,
        #[arg(long)]
        target: Option<i64>,
        #[arg(long, default_value_t = Strategy::Correct)]
        strategy: Strategy,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Simulate {
            algorithm,
            values,
            target,
            strategy,
        } => {
            let values = parse_values(&values).context("invalid value list")?;
            simulate(algorithm, values, target, strategy)?
        }
        Command::Ranking { limit } => {
            let store = open_store(&cli.data_dir)?;
            serde_json::to_value(store.ranking(limit))?
        }
        Command::Stats => serde_json::to_value(open_store(&cli.data_dir)?.overall_stats())?,
        Command::Reset => {
            let mut store = open_store(&cli.data_dir)?;
            let removed = store.history().len();
            store.reset().context("failed to reset run history")?;
            json!({ "removed": removed })
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn open_store(data_dir: &Path) -> Result<RunStore> {
    RunStore::open_in(data_dir)
        .with_context(|| format!("failed to open run history in '{}'", data_dir.display()))
}

fn simulate(
    algorithm: Algorithm,
    mut values: Vec<i64>,
    target: Option<i64>,
    strategy: Strategy,
) -> Result<Value> {
    let (statistics, result) = match algorithm {
        Algorithm::MergeSort => {
            let mut stepper = MergeStepper::new(&values);
            run_to_completion(&mut stepper, scripted(strategy));
            (
                serde_json::to_value(stepper.statistics())?,
                serde_json::to_value(stepper.final_result())?,
            )
        }
        Algorithm::QuickSort => {
            let mut stepper = QuickStepper::new(&values);
            run_to_completion(&mut stepper, scripted(strategy));
            (
                serde_json::to_value(stepper.statistics())?,
                serde_json::to_value(stepper.final_result())?,
            )
        }
        Algorithm::BinarySearch => {
            let target = target.context("binary search needs --target")?;
            values.sort_unstable();
            let mut stepper = SearchStepper::new(&values, target);
            run_to_completion(&mut stepper, scripted(strategy));
            (
                serde_json::to_value(stepper.statistics())?,
                serde_json::to_value(stepper.final_result())?,
            )
        }
    };

    Ok(json!({
        "algorithm": algorithm,
        "strategy": strategy,
        "input": values,
        "statistics": statistics,
        "result": result,
    }))
}
