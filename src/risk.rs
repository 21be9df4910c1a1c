use crate::config::{ScoringConfig, HIGH_RISK_BUG_FIX_THRESHOLD};
use crate::error::{BugmapError, Result};
use crate::model::{FeatureVector, FileFeatureRow, RiskLabel, ScoreSummary, ScoredRow};
use std::path::Path;
use tracing::info;

pub fn classify(row: &FileFeatureRow, predicted_buggy: u8) -> RiskLabel {
    classify_with_threshold(row, predicted_buggy, HIGH_RISK_BUG_FIX_THRESHOLD)
}

pub fn classify_with_threshold(
    row: &FileFeatureRow,
    predicted_buggy: u8,
    high_risk_threshold: u64,
) -> RiskLabel {
    if predicted_buggy == 1 && row.bug_fix_count >= high_risk_threshold {
        RiskLabel::High
    } else if predicted_buggy == 1 {
        RiskLabel::Medium
    } else {
        RiskLabel::Low
    }
}

/// A trained binary model. One 0/1 prediction per feature vector, same order.
pub trait Classifier {
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<u8>>;
}

impl<F> Classifier for F
where
    F: Fn(&[FeatureVector]) -> Result<Vec<u8>>,
{
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<u8>> {
        self(features)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionFile {
    predictions: Vec<u8>,
}

impl PredictionFile {
    pub fn new(predictions: Vec<u8>) -> Self {
        Self { predictions }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::new(serde_json::from_str(&raw)?))
    }
}

impl Classifier for PredictionFile {
    fn predict(&self, _features: &[FeatureVector]) -> Result<Vec<u8>> {
        Ok(self.predictions.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryBaseline {
    pub min_bug_fixes: u64,
}

impl Default for HistoryBaseline {
    fn default() -> Self {
        Self { min_bug_fixes: 1 }
    }
}

impl Classifier for HistoryBaseline {
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<u8>> {
        Ok(features
            .iter()
            .map(|f| u8::from(f.bug_fix_count >= self.min_bug_fixes))
            .collect())
    }
}

pub fn feature_matrix(rows: &[FileFeatureRow]) -> Vec<FeatureVector> {
    rows.iter().map(FileFeatureRow::features).collect()
}

/// The classifier must answer with exactly one 0 or 1 per row.
pub fn score<C>(rows: Vec<FileFeatureRow>, classifier: &C, config: &ScoringConfig) -> Result<Vec<ScoredRow>>
where
    C: Classifier + ?Sized,
{
    let matrix = feature_matrix(&rows);
    let predictions = classifier.predict(&matrix)?;

    if predictions.len() != rows.len() {
        return Err(BugmapError::ClassifierContract(format!(
            "expected {} predictions, got {}",
            rows.len(),
            predictions.len()
        )));
    }
    if let Some((idx, value)) = predictions.iter().enumerate().find(|(_, p)| **p > 1) {
        return Err(BugmapError::ClassifierContract(format!(
            "prediction {idx} is {value}, expected 0 or 1"
        )));
    }

    let scored: Vec<ScoredRow> = rows
        .into_iter()
        .zip(predictions)
        .map(|(row, predicted)| {
            let label = classify_with_threshold(&row, predicted, config.high_risk_threshold);
            ScoredRow::new(row, predicted, label)
        })
        .collect();

    info!(
        files = scored.len(),
        high = scored.iter().filter(|r| r.risk_level == RiskLabel::High).count(),
        "scored files"
    );
    Ok(scored)
}

/// Which scored rows to emit. Summary counts are taken before filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub min_commits: u64,
    pub buggy_only: bool,
}

impl RowFilter {
    pub fn matches(&self, row: &ScoredRow) -> bool {
        row.commit_count >= self.min_commits && (!self.buggy_only || row.predicted_buggy == 1)
    }

    pub fn apply(&self, rows: &[ScoredRow]) -> Vec<ScoredRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

pub fn summarize(rows: &[ScoredRow], top_n: usize) -> ScoreSummary {
    let mut top_risky: Vec<ScoredRow> = rows
        .iter()
        .filter(|r| r.predicted_buggy == 1)
        .cloned()
        .collect();
    top_risky.sort_by(|a, b| {
        b.bug_fix_count
            .cmp(&a.bug_fix_count)
            .then_with(|| a.file.cmp(&b.file))
    });
    top_risky.truncate(top_n);

    ScoreSummary {
        total_files: rows.len(),
        buggy_files: rows.iter().filter(|r| r.predicted_buggy == 1).count(),
        high_risk_files: rows.iter().filter(|r| r.risk_level == RiskLabel::High).count(),
        top_risky,
    }
}
