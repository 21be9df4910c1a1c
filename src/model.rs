use crate::config::{FEATURE_COLUMNS, UNKNOWN_FIELD};
use chrono::{DateTime, Utc};
use console::{style, StyledObject};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, rename = "repo", alias = "repository", skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, rename = "date", alias = "timestamp")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl CommitRecord {
    pub fn repository(&self) -> &str {
        self.repository.as_deref().unwrap_or(UNKNOWN_FIELD)
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or(UNKNOWN_FIELD)
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileKey(String);

impl FileKey {
    pub fn new(repository: &str, path: &str) -> Self {
        Self(format!("{repository}::{path}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStats {
    pub commit_count: u64,
    pub authors: HashSet<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub bug_fix_count: u64,
}

impl FileStats {
    pub fn record(&mut self, author: &str, timestamp: DateTime<Utc>, is_bug_fix: bool) {
        self.commit_count += 1;
        if !self.authors.contains(author) {
            self.authors.insert(author.to_string());
        }
        self.touch(Some(timestamp));
        if is_bug_fix {
            self.bug_fix_count += 1;
        }
    }

    pub fn merge(&mut self, other: FileStats) {
        self.commit_count += other.commit_count;
        self.authors.extend(other.authors);
        self.touch(other.last_modified);
        self.bug_fix_count += other.bug_fix_count;
    }

    fn touch(&mut self, timestamp: Option<DateTime<Utc>>) {
        self.last_modified = match (self.last_modified, timestamp) {
            (Some(current), Some(seen)) => Some(current.max(seen)),
            (current, seen) => current.or(seen),
        };
    }

    pub fn to_row(&self, file: FileKey, reference_time: DateTime<Utc>) -> FileFeatureRow {
        FileFeatureRow {
            file,
            commit_count: self.commit_count,
            unique_authors: self.authors.len() as u64,
            last_modified_days_ago: self
                .last_modified
                .map(|ts| days_between(ts, reference_time)),
            bug_fix_count: self.bug_fix_count,
            is_buggy: u8::from(self.bug_fix_count > 0),
        }
    }
}

pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Per-file feature row. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFeatureRow {
    pub file: FileKey,
    pub commit_count: u64,
    pub unique_authors: u64,
    pub last_modified_days_ago: Option<i64>,
    pub bug_fix_count: u64,
    pub is_buggy: u8,
}

impl FileFeatureRow {
    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            commit_count: self.commit_count,
            unique_authors: self.unique_authors,
            last_modified_days_ago: self.last_modified_days_ago,
            bug_fix_count: self.bug_fix_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub commit_count: u64,
    pub unique_authors: u64,
    pub last_modified_days_ago: Option<i64>,
    pub bug_fix_count: u64,
}

impl FeatureVector {
    pub const ARITY: usize = FEATURE_COLUMNS.len();

    /// Columns follow `FEATURE_COLUMNS`; a missing age becomes NaN.
    pub fn to_array(&self) -> [f64; Self::ARITY] {
        [
            self.commit_count as f64,
            self.unique_authors as f64,
            self.last_modified_days_ago.map_or(f64::NAN, |d| d as f64),
            self.bug_fix_count as f64,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    High,
    Medium,
    Low,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::High => "High",
            RiskLabel::Medium => "Medium",
            RiskLabel::Low => "Low",
        }
    }

    pub fn styled(&self) -> StyledObject<&'static str> {
        match self {
            RiskLabel::High => style(self.as_str()).red().bold(),
            RiskLabel::Medium => style(self.as_str()).yellow(),
            RiskLabel::Low => style(self.as_str()).green(),
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub file: FileKey,
    pub commit_count: u64,
    pub unique_authors: u64,
    pub last_modified_days_ago: Option<i64>,
    pub bug_fix_count: u64,
    pub is_buggy: u8,
    pub predicted_buggy: u8,
    pub risk_level: RiskLabel,
}

impl ScoredRow {
    pub fn new(row: FileFeatureRow, predicted_buggy: u8, risk_level: RiskLabel) -> Self {
        Self {
            file: row.file,
            commit_count: row.commit_count,
            unique_authors: row.unique_authors,
            last_modified_days_ago: row.last_modified_days_ago,
            bug_fix_count: row.bug_fix_count,
            is_buggy: row.is_buggy,
            predicted_buggy,
            risk_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total_files: usize,
    pub buggy_files: usize,
    pub high_risk_files: usize,
    pub top_risky: Vec<ScoredRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub reference_time: DateTime<Utc>,
    pub rows: Vec<FileFeatureRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub reference_time: DateTime<Utc>,
    pub summary: ScoreSummary,
    pub rows: Vec<ScoredRow>,
}
