use crate::error::{BugmapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const BUG_KEYWORDS: [&str; 5] = ["fix", "bug", "issue", "error", "patch"];

pub const HIGH_RISK_BUG_FIX_THRESHOLD: u64 = 3;

pub const COMMIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub const UNKNOWN_FIELD: &str = "unknown";

/// Classifier input columns, in the order the model was trained on.
pub const FEATURE_COLUMNS: [&str; 4] = [
    "commit_count",
    "unique_authors",
    "last_modified_days_ago",
    "bug_fix_count",
];

pub const TOP_RISKY_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub bug_keywords: Vec<String>,
    pub high_risk_threshold: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            bug_keywords: BUG_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            high_risk_threshold: HIGH_RISK_BUG_FIX_THRESHOLD,
        }
    }
}

impl ScoringConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validated()
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bug_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_high_risk_threshold(mut self, threshold: u64) -> Self {
        self.high_risk_threshold = threshold;
        self
    }

    pub fn validated(mut self) -> Result<Self> {
        self.bug_keywords = self
            .bug_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if self.bug_keywords.is_empty() {
            return Err(BugmapError::Config(
                "at least one bug keyword is required".to_string(),
            ));
        }
        if self.high_risk_threshold == 0 {
            return Err(BugmapError::Config(
                "high risk threshold must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}
