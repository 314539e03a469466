//! Start-up settings read from the environment.

use crate::grid::{GridConfig, DEFAULT_GRID_SIZE, DEFAULT_ITEM_COUNT, DEFAULT_MAX_ATTEMPTS};
use std::path::PathBuf;
use std::str::FromStr;

/// Largest board that still fits a terminal at two columns per cell.
pub const MAX_GRID_SIZE: usize = 32;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub grid: GridConfig,
    /// Fixed seed for reproducible boards; random when unset.
    pub seed: Option<u64>,
    /// Where log output goes while the terminal is in raw mode.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparsable or out-of-range values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let size = parse(&lookup, "BEES_GRID_SIZE")
            .filter(|v: &usize| (2..=MAX_GRID_SIZE).contains(v))
            .unwrap_or(DEFAULT_GRID_SIZE);
        let items = parse(&lookup, "BEES_ITEMS").unwrap_or(DEFAULT_ITEM_COUNT);
        let obstacles = parse(&lookup, "BEES_OBSTACLES").unwrap_or(size.saturating_mul(2));
        let max_attempts = parse(&lookup, "BEES_MAX_ATTEMPTS")
            .filter(|v: &u32| *v > 0)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let seed = parse(&lookup, "BEES_SEED");
        let log_file = lookup("BEES_LOG_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            grid: GridConfig {
                size,
                items,
                obstacles,
                max_attempts,
            },
            seed,
            log_file,
        }
    }

    /// Filter directives for the file logger. Without a log file there is
    /// nowhere to write while the terminal is in raw mode, so logging stays
    /// off even when `RUST_LOG` is set.
    pub fn log_filter(&self, rust_log: Option<&str>) -> Option<String> {
        self.log_file.as_ref()?;
        let filter = rust_log
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_LOG_FILTER);
        Some(filter.to_string())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}
