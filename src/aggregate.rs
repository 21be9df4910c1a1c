use crate::config::{ScoringConfig, COMMIT_TIMESTAMP_FORMAT};
use crate::model::{CommitRecord, FileFeatureRow, FileKey, FileStats};
use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

pub fn parse_commit_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.trim() != raw {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(raw, COMMIT_TIMESTAMP_FORMAT).ok()?;
    // chrono stores second 60 as an extra billion nanoseconds
    if naive.nanosecond() >= 1_000_000_000 {
        return None;
    }
    Some(Utc.from_utc_datetime(&naive))
}

// "prefix" counts as "fix"
pub fn is_bug_fix_message(message: &str, keywords: &[String]) -> bool {
    let message = message.to_lowercase();
    keywords.iter().any(|k| message.contains(k.as_str()))
}

#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    order: Vec<FileKey>,
    stats: HashMap<FileKey, FileStats>,
    folded: usize,
    skipped: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one commit in. Returns `false` when the commit was dropped for a bad timestamp.
    pub fn fold(&mut self, commit: &CommitRecord, config: &ScoringConfig) -> bool {
        let Some(timestamp) = commit.timestamp.as_deref().and_then(parse_commit_timestamp) else {
            debug!(
                sha = commit.sha.as_deref().unwrap_or("-"),
                date = commit.timestamp.as_deref().unwrap_or("-"),
                "skipping commit with unparseable timestamp"
            );
            self.skipped += 1;
            return false;
        };

        let repository = commit.repository();
        let author = commit.author();
        let is_bug_fix = is_bug_fix_message(commit.message(), &config.bug_keywords);

        // Duplicate paths within one commit are counted once per occurrence.
        for path in &commit.files {
            self.entry(FileKey::new(repository, path))
                .record(author, timestamp, is_bug_fix);
        }
        self.folded += 1;
        true
    }

    fn entry(&mut self, key: FileKey) -> &mut FileStats {
        if !self.stats.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.stats.entry(key).or_default()
    }

    pub fn merge(mut self, other: Accumulator) -> Accumulator {
        let Accumulator {
            order,
            mut stats,
            folded,
            skipped,
        } = other;

        for key in order {
            if let Some(partial) = stats.remove(&key) {
                self.entry(key).merge(partial);
            }
        }
        self.folded += folded;
        self.skipped += skipped;
        self
    }

    pub fn get(&self, key: &FileKey) -> Option<&FileStats> {
        self.stats.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn folded(&self) -> usize {
        self.folded
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(mut self, reference_time: DateTime<Utc>) -> Vec<FileFeatureRow> {
        info!(
            commits = self.folded,
            skipped = self.skipped,
            files = self.order.len(),
            "aggregated commit history"
        );
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|key| {
                let stats = self.stats.remove(&key)?;
                Some(stats.to_row(key, reference_time))
            })
            .collect()
    }
}

pub fn aggregate(
    commits: &[CommitRecord],
    reference_time: DateTime<Utc>,
    config: &ScoringConfig,
) -> Vec<FileFeatureRow> {
    let mut acc = Accumulator::new();
    for commit in commits {
        acc.fold(commit, config);
    }
    acc.finish(reference_time)
}

/// Row order follows the merge order rather than input order.
pub fn aggregate_parallel(
    commits: &[CommitRecord],
    reference_time: DateTime<Utc>,
    config: &ScoringConfig,
) -> Vec<FileFeatureRow> {
    commits
        .par_iter()
        .fold(Accumulator::new, |mut acc, commit| {
            acc.fold(commit, config);
            acc
        })
        .reduce(Accumulator::new, Accumulator::merge)
        .finish(reference_time)
}
