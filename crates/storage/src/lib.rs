use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shared::{domain::Level, error::ErrorCode, protocol::RunSummary};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_FILE_NAME: &str = "runs.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("run history '{}' is not valid JSON: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode run history: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Storage
    }

    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    history: Vec<RunSummary>,
}

/// Aggregates over the whole run history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_runs: usize,
    pub completed_runs: usize,
    pub best_score: u64,
    /// Mean of per-run precision across every run.
    pub mean_precision: f64,
    /// Mean elapsed seconds across completed runs.
    pub mean_completion_secs: f64,
    pub favourite_level: Level,
    pub completion_rate: f64,
}

/// Run history persisted as a single JSON document.
#[derive(Debug)]
pub struct RunStore {
    path: PathBuf,
    history: Vec<RunSummary>,
}

impl RunStore {
    /// Loads the history at `path`. A missing file is an empty history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let history = match fs::read_to_string(&path) {
            Ok(raw) => {
                let document: Document = serde_json::from_str(&raw).map_err(|source| {
                    StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    }
                })?;
                document.history
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(StoreError::io("read", &path, err)),
        };
        debug!(path = %path.display(), runs = history.len(), "run history loaded");
        Ok(Self { path, history })
    }

    pub fn open_in(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &[RunSummary] {
        &self.history
    }

    pub fn append(&mut self, summary: RunSummary) -> Result<(), StoreError> {
        info!(
            run_id = %summary.run_id,
            algorithm = summary.algorithm.as_str(),
            score = summary.score,
            completed = summary.completed,
            "recording run"
        );
        self.history.push(summary);
        if let Err(err) = self.save() {
            self.history.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Completed runs, best score first. Equal scores keep insertion order.
    pub fn ranking(&self, limit: usize) -> Vec<&RunSummary> {
        let mut completed: Vec<&RunSummary> =
            self.history.iter().filter(|run| run.completed).collect();
        completed.sort_by(|a, b| b.score.cmp(&a.score));
        completed.truncate(limit);
        completed
    }

    pub fn overall_stats(&self) -> OverallStats {
        let total_runs = self.history.len();
        let completed: Vec<&RunSummary> =
            self.history.iter().filter(|run| run.completed).collect();

        OverallStats {
            total_runs,
            completed_runs: completed.len(),
            best_score: self.history.iter().map(|run| run.score).max().unwrap_or(0),
            mean_precision: mean(self.history.iter().map(RunSummary::precision)),
            mean_completion_secs: mean(completed.iter().map(|run| run.elapsed_secs)),
            favourite_level: favourite_level(&self.history),
            completion_rate: if total_runs == 0 {
                0.0
            } else {
                completed.len() as f64 / total_runs as f64 * 100.0
            },
        }
    }

    /// Drops every recorded run and persists the empty history.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        info!(path = %self.path.display(), runs = self.history.len(), "resetting run history");
        self.history.clear();
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| StoreError::io("create directory", parent, err))?;
        }

        let document = DocumentRef {
            history: &self.history,
        };
        let raw = serde_json::to_string_pretty(&document)?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, raw).map_err(|err| StoreError::io("write", &staging, err))?;
        fs::rename(&staging, &self.path)
            .map_err(|err| StoreError::io("replace", &self.path, err))?;
        debug!(path = %self.path.display(), runs = self.history.len(), "run history saved");
        Ok(())
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    history: &'a [RunSummary],
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Most played level; ties go to the level played first. Easy when empty.
fn favourite_level(history: &[RunSummary]) -> Level {
    let mut counts: HashMap<Level, usize> = HashMap::new();
    for run in history {
        *counts.entry(run.level).or_default() += 1;
    }

    let mut favourite = None;
    for run in history {
        let count = counts[&run.level];
        match favourite {
            Some((_, best)) if best >= count => {}
            _ => favourite = Some((run.level, count)),
        }
    }
    favourite.map_or(Level::Easy, |(level, _)| level)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
