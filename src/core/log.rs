//! Human-readable game log.
//!
//! One line per notable event (casts, triggers, damage, deaths, fizzles,
//! wins). The log is append-only and lives inside `GameData`, so it is
//! part of every snapshot. Each line is mirrored to `tracing` at `info`.

use serde::{Deserialize, Serialize};

/// Append-only list of log lines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    lines: im::Vector<String>,
}

impl GameLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "ccg_rules::game_log", "{}", line);
        self.lines.push_back(line);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&String> {
        self.lines.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    /// Lines appended after the first `start` lines.
    pub fn since(&self, start: usize) -> impl Iterator<Item = &String> {
        self.lines.iter().skip(start)
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}
