use bugmap::config::ScoringConfig;
use bugmap::error::{BugmapError, Result};
use bugmap::model::{FeatureVector, FileFeatureRow, FileKey, RiskLabel};
use bugmap::risk::{
    classify, classify_with_threshold, feature_matrix, score, summarize, HistoryBaseline,
    PredictionFile, RowFilter,
};
use pretty_assertions::assert_eq;
use std::io::Write;

fn row(path: &str, commit_count: u64, bug_fix_count: u64) -> FileFeatureRow {
    FileFeatureRow {
        file: FileKey::new("r", path),
        commit_count,
        unique_authors: 1,
        last_modified_days_ago: Some(10),
        bug_fix_count,
        is_buggy: u8::from(bug_fix_count > 0),
    }
}

#[test]
fn decision_list_priority() {
    assert_eq!(classify(&row("a", 5, 3), 1), RiskLabel::High);
    assert_eq!(classify(&row("a", 5, 7), 1), RiskLabel::High);
    assert_eq!(classify(&row("a", 5, 2), 1), RiskLabel::Medium);
    assert_eq!(classify(&row("a", 5, 0), 1), RiskLabel::Medium);
    assert_eq!(classify(&row("a", 5, 0), 0), RiskLabel::Low);
    assert_eq!(classify(&row("a", 9, 9), 0), RiskLabel::Low);
}

#[test]
fn threshold_is_configurable() {
    assert_eq!(classify_with_threshold(&row("a", 5, 2), 1, 2), RiskLabel::High);
    assert_eq!(classify_with_threshold(&row("a", 5, 4), 1, 5), RiskLabel::Medium);
}

#[test]
fn feature_matrix_keeps_column_order() {
    let mut r = row("a", 4, 2);
    r.unique_authors = 3;
    r.last_modified_days_ago = None;

    let matrix = feature_matrix(&[r]);

    assert_eq!(
        matrix,
        vec![FeatureVector {
            commit_count: 4,
            unique_authors: 3,
            last_modified_days_ago: None,
            bug_fix_count: 2,
        }]
    );
    let dense = matrix[0].to_array();
    assert_eq!(dense[0], 4.0);
    assert_eq!(dense[1], 3.0);
    assert!(dense[2].is_nan());
    assert_eq!(dense[3], 2.0);
}

#[test]
fn score_labels_with_injected_predictions() {
    let rows = vec![row("a", 5, 3), row("b", 5, 2), row("c", 5, 9)];
    let classifier = PredictionFile::new(vec![1, 1, 0]);

    let scored = score(rows, &classifier, &ScoringConfig::default()).unwrap();

    let labels: Vec<RiskLabel> = scored.iter().map(|r| r.risk_level).collect();
    assert_eq!(labels, vec![RiskLabel::High, RiskLabel::Medium, RiskLabel::Low]);
    assert_eq!(scored[2].predicted_buggy, 0);
    assert_eq!(scored[2].is_buggy, 1);
}

#[test]
fn score_accepts_closure_classifier() {
    let always = |features: &[FeatureVector]| -> Result<Vec<u8>> { Ok(vec![1; features.len()]) };
    let config = ScoringConfig::default().with_high_risk_threshold(1);

    let scored = score(vec![row("a", 1, 1), row("b", 1, 0)], &always, &config).unwrap();

    assert_eq!(scored[0].risk_level, RiskLabel::High);
    assert_eq!(scored[1].risk_level, RiskLabel::Medium);
}

#[test]
fn prediction_count_mismatch_is_fatal() {
    let classifier = PredictionFile::new(vec![1]);
    let err = score(vec![row("a", 1, 1), row("b", 1, 1)], &classifier, &ScoringConfig::default())
        .unwrap_err();
    assert!(matches!(err, BugmapError::ClassifierContract(_)));
}

#[test]
fn non_binary_prediction_is_fatal() {
    let classifier = PredictionFile::new(vec![0, 2]);
    let err = score(vec![row("a", 1, 1), row("b", 1, 1)], &classifier, &ScoringConfig::default())
        .unwrap_err();
    assert!(matches!(err, BugmapError::ClassifierContract(_)));
}

#[test]
fn classifier_errors_propagate() {
    let broken = |_: &[FeatureVector]| -> Result<Vec<u8>> {
        Err(BugmapError::ClassifierContract("model expects 5 columns".to_string()))
    };
    assert!(score(vec![row("a", 1, 1)], &broken, &ScoringConfig::default()).is_err());
}

#[test]
fn history_baseline_uses_bug_fix_count() {
    let rows = vec![row("a", 3, 0), row("b", 3, 1), row("c", 3, 4)];

    let default = score(rows.clone(), &HistoryBaseline::default(), &ScoringConfig::default()).unwrap();
    let predicted: Vec<u8> = default.iter().map(|r| r.predicted_buggy).collect();
    assert_eq!(predicted, vec![0, 1, 1]);

    let strict = score(rows, &HistoryBaseline { min_bug_fixes: 2 }, &ScoringConfig::default()).unwrap();
    let predicted: Vec<u8> = strict.iter().map(|r| r.predicted_buggy).collect();
    assert_eq!(predicted, vec![0, 0, 1]);
}

#[test]
fn prediction_file_loads_json_array() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[0, 1, 1]").unwrap();

    let classifier = PredictionFile::load(file.path()).unwrap();

    assert_eq!(classifier, PredictionFile::new(vec![0, 1, 1]));
}

#[test]
fn summary_counts_and_top_list() {
    let rows = vec![row("a", 9, 5), row("b", 9, 1), row("c", 9, 3), row("d", 9, 8)];
    let scored = score(rows, &PredictionFile::new(vec![1, 1, 1, 0]), &ScoringConfig::default()).unwrap();

    let summary = summarize(&scored, 2);

    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.buggy_files, 3);
    assert_eq!(summary.high_risk_files, 2);
    let top: Vec<&str> = summary.top_risky.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(top, vec!["r::a", "r::c"]);
}

#[test]
fn row_filter_applies_min_commits_and_buggy_only() {
    let rows = vec![row("a", 1, 1), row("b", 5, 1), row("c", 5, 0)];
    let scored = score(rows, &HistoryBaseline::default(), &ScoringConfig::default()).unwrap();

    let by_commits = RowFilter { min_commits: 2, buggy_only: false }.apply(&scored);
    let files: Vec<&str> = by_commits.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["r::b", "r::c"]);

    let both = RowFilter { min_commits: 2, buggy_only: true }.apply(&scored);
    let files: Vec<&str> = both.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["r::b"]);

    assert_eq!(RowFilter::default().apply(&scored).len(), 3);
}
