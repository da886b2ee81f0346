//! Per-URL run history and trend comparison.
//!
//! Snapshots are persisted in one JSON file mapping the exact target string
//! to an ordered list of `{timestamp, stats}` entries, oldest first. The
//! list is capped; recording the eleventh run drops the first. The store is
//! read in full, appended to, and written back in full: a plain
//! read-modify-write, not a transaction.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profiler::DomStats;

/// Full contents of the history file.
pub type HistoryMap = BTreeMap<String, Vec<HistoryEntry>>;

/// One recorded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// ISO-8601 timestamp of the run.
    pub timestamp: String,
    pub stats: DomStats,
}

/// Bounded rolling history store backed by a JSON file.
pub struct HistoryStore {
    path: PathBuf,
    cap: usize,
}

impl HistoryStore {
    pub fn new(path: PathBuf, cap: usize) -> Self {
        Self { path, cap }
    }

    /// Read the whole store. Missing or malformed content degrades to an
    /// empty map rather than failing the run.
    pub fn load(&self) -> HistoryMap {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return HistoryMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("ignoring malformed history at {}: {}", self.path.display(), e);
                HistoryMap::new()
            }
        }
    }

    /// Entries recorded for one target, oldest first.
    pub fn entries(&self, url: &str) -> Vec<HistoryEntry> {
        self.load().remove(url).unwrap_or_default()
    }

    /// Append a snapshot for `url`, enforce the cap, and write the store
    /// back. Returns the timestamp assigned to the new entry.
    pub fn record(&self, url: &str, stats: &DomStats) -> Result<String> {
        let mut all = self.load();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let entries = all.entry(url.to_string()).or_default();
        entries.push(HistoryEntry {
            timestamp: timestamp.clone(),
            stats: stats.clone(),
        });
        while entries.len() > self.cap {
            entries.remove(0);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::StorageError(format!("create {}: {}", parent.display(), e)))?;
            }
        }
        let json = serde_json::to_string_pretty(&all)
            .map_err(|e| Error::StorageError(format!("encode history: {}", e)))?;
        fs::write(&self.path, json)
            .map_err(|e| Error::StorageError(format!("write {}: {}", self.path.display(), e)))?;

        Ok(timestamp)
    }
}

/// Direction of a numeric change between two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

/// A before/after pair for one numeric statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub previous: u64,
    pub current: u64,
}

impl Delta {
    fn of(previous: u64, current: u64) -> Self {
        Self { previous, current }
    }

    pub fn diff(&self) -> i64 {
        self.current as i64 - self.previous as i64
    }

    pub fn direction(&self) -> Direction {
        match self.diff() {
            d if d > 0 => Direction::Increased,
            d if d < 0 => Direction::Decreased,
            _ => Direction::Unchanged,
        }
    }
}

/// A tag whose frequency changed between the two most recent runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChange {
    pub tag: String,
    pub previous: u64,
    pub current: u64,
}

/// Newest run compared against the one before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub total_nodes: Delta,
    pub element_nodes: Delta,
    pub text_nodes: Delta,
    pub comment_nodes: Delta,
    pub max_depth: Delta,
    /// Union of tag names across both runs, changed counts only.
    pub tag_changes: Vec<TagChange>,
    /// `(timestamp, total node count)` across all retained runs, oldest first.
    pub totals_over_time: Vec<(String, u64)>,
}

/// Compare the newest entry against the second-newest.
///
/// Returns `None` when fewer than two entries exist; the caller reports
/// that no prior data is available, which is informational, not an error.
pub fn compare_latest(entries: &[HistoryEntry]) -> Option<Comparison> {
    if entries.len() < 2 {
        return None;
    }
    let current = &entries[entries.len() - 1].stats;
    let previous = &entries[entries.len() - 2].stats;

    let tags: BTreeSet<&String> = current
        .tag_counts
        .keys()
        .chain(previous.tag_counts.keys())
        .collect();
    let tag_changes = tags
        .into_iter()
        .filter_map(|tag| {
            let prev = previous.tag_counts.get(tag).copied().unwrap_or(0);
            let curr = current.tag_counts.get(tag).copied().unwrap_or(0);
            (prev != curr).then(|| TagChange {
                tag: tag.clone(),
                previous: prev,
                current: curr,
            })
        })
        .collect();

    Some(Comparison {
        total_nodes: Delta::of(previous.total_nodes, current.total_nodes),
        element_nodes: Delta::of(previous.element_nodes, current.element_nodes),
        text_nodes: Delta::of(previous.text_nodes, current.text_nodes),
        comment_nodes: Delta::of(previous.comment_nodes, current.comment_nodes),
        max_depth: Delta::of(previous.max_depth, current.max_depth),
        tag_changes,
        totals_over_time: entries
            .iter()
            .map(|e| (e.timestamp.clone(), e.stats.total_nodes))
            .collect(),
    })
}
