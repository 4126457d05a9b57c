use std::{env, fs, path::PathBuf};

use serde::Deserialize;
use shared::domain::{Algorithm, Level};
use tracing::warn;

pub const CONFIG_FILE: &str = "mergemind.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub algorithm: Algorithm,
    pub level: Level,
    pub min_value: i64,
    pub max_value: i64,
    /// Forces hints on or off regardless of the level.
    pub hints: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            algorithm: Algorithm::MergeSort,
            level: Level::default(),
            min_value: 1,
            max_value: 99,
            hints: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    data_dir: Option<PathBuf>,
    algorithm: Option<Algorithm>,
    level: Option<Level>,
    min_value: Option<i64>,
    max_value: Option<i64>,
    hints: Option<bool>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(CONFIG_FILE).ok();
    resolve_settings(file.as_deref(), |key| env::var(key).ok())
}

/// Defaults, then the TOML document, then `APP__*` variables.
fn resolve_settings(file: Option<&str>, var: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.data_dir {
                    settings.data_dir = v;
                }
                if let Some(v) = file_cfg.algorithm {
                    settings.algorithm = v;
                }
                if let Some(v) = file_cfg.level {
                    settings.level = v;
                }
                if let Some(v) = file_cfg.min_value {
                    settings.min_value = v;
                }
                if let Some(v) = file_cfg.max_value {
                    settings.max_value = v;
                }
                if file_cfg.hints.is_some() {
                    settings.hints = file_cfg.hints;
                }
            }
            Err(err) => warn!(file = CONFIG_FILE, error = %err, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = var("APP__DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = parsed(&var, "APP__ALGORITHM") {
        settings.algorithm = v;
    }
    if let Some(v) = parsed(&var, "APP__LEVEL") {
        settings.level = v;
    }
    if let Some(v) = parsed(&var, "APP__MIN_VALUE") {
        settings.min_value = v;
    }
    if let Some(v) = parsed(&var, "APP__MAX_VALUE") {
        settings.max_value = v;
    }
    if let Some(v) = parsed(&var, "APP__HINTS") {
        settings.hints = Some(v);
    }

    settings
}

fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
