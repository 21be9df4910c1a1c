use crate::error::Result;
use crate::model::{
    FeaturesOutput, FileFeatureRow, ScoreOutput, ScoreSummary, ScoredRow, SCHEMA_VERSION,
};
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::io::Write;

const TABLE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Ndjson,
    Csv,
}

impl OutputFormat {
    pub fn from_flags(json: bool, ndjson: bool, csv: bool) -> Self {
        if json {
            OutputFormat::Json
        } else if ndjson {
            OutputFormat::Ndjson
        } else if csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Table
        }
    }
}

pub fn write_csv<W: Write, T: Serialize>(rows: &[T], out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_ndjson<W: Write, T: Serialize>(rows: &[T], mut out: W) -> Result<()> {
    for row in rows {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    Ok(())
}

pub fn write_features_json<W: Write>(
    rows: &[FileFeatureRow],
    reference_time: DateTime<Utc>,
    mut out: W,
) -> Result<()> {
    let output = FeaturesOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        reference_time,
        rows: rows.to_vec(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

pub fn write_score_json<W: Write>(
    rows: &[ScoredRow],
    summary: &ScoreSummary,
    reference_time: DateTime<Utc>,
    mut out: W,
) -> Result<()> {
    let output = ScoreOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        reference_time,
        summary: summary.clone(),
        rows: rows.to_vec(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

fn days_cell(days: Option<i64>) -> String {
    days.map_or_else(|| "-".to_string(), |d| d.to_string())
}

pub fn write_features_table<W: Write>(rows: &[FileFeatureRow], mut out: W) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "No data to display")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<50} {:>8} {:>8} {:>8} {:>8} {:>6}",
        style("File").bold(),
        style("Commits").bold(),
        style("Authors").bold(),
        style("Age(d)").bold(),
        style("Fixes").bold(),
        style("Buggy").bold()
    )?;
    writeln!(out, "{}", "─".repeat(93))?;
    for r in rows.iter().take(TABLE_LIMIT) {
        writeln!(
            out,
            "{:<50} {:>8} {:>8} {:>8} {:>8} {:>6}",
            r.file.as_str(),
            r.commit_count,
            r.unique_authors,
            days_cell(r.last_modified_days_ago),
            r.bug_fix_count,
            r.is_buggy
        )?;
    }
    if rows.len() > TABLE_LIMIT {
        writeln!(out, "\n... and {} more entries", rows.len() - TABLE_LIMIT)?;
    }
    Ok(())
}

pub fn write_score_table<W: Write>(
    rows: &[ScoredRow],
    summary: &ScoreSummary,
    mut out: W,
) -> Result<()> {
    writeln!(out, "{}", style("Summary").bold())?;
    writeln!(out, "{}", "─".repeat(50))?;
    writeln!(out, "Total files: {}", style(summary.total_files).cyan())?;
    writeln!(out, "Predicted buggy files: {}", style(summary.buggy_files).yellow())?;
    writeln!(out, "High risk files: {}", style(summary.high_risk_files).red())?;

    if !summary.top_risky.is_empty() {
        writeln!(out, "\n{}", style("Top Risky Files").bold())?;
        for r in &summary.top_risky {
            writeln!(
                out,
                "  {:<60} fixes: {:>4}  {}",
                r.file.as_str(),
                r.bug_fix_count,
                r.risk_level.styled()
            )?;
        }
    }

    writeln!(out, "\n{}", style("File-Level Predictions").bold())?;
    if rows.is_empty() {
        writeln!(out, "No data to display")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<50} {:>8} {:>8} {:>8} {:>8} {:>8}",
        style("File").bold(),
        style("Commits").bold(),
        style("Authors").bold(),
        style("Age(d)").bold(),
        style("Fixes").bold(),
        style("Risk").bold()
    )?;
    writeln!(out, "{}", "─".repeat(95))?;
    for r in rows.iter().take(TABLE_LIMIT) {
        writeln!(
            out,
            "{:<50} {:>8} {:>8} {:>8} {:>8} {:>8}",
            r.file.as_str(),
            r.commit_count,
            r.unique_authors,
            days_cell(r.last_modified_days_ago),
            r.bug_fix_count,
            r.risk_level.styled()
        )?;
    }
    if rows.len() > TABLE_LIMIT {
        writeln!(out, "\n... and {} more entries", rows.len() - TABLE_LIMIT)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FEATURE_COLUMNS;
    use crate::model::{FeatureVector, FileKey, RiskLabel};

    fn row(path: &str, days: Option<i64>) -> FileFeatureRow {
        FileFeatureRow {
            file: FileKey::new("r", path),
            commit_count: 2,
            unique_authors: 2,
            last_modified_days_ago: days,
            bug_fix_count: 1,
            is_buggy: 1,
        }
    }

    #[test]
    fn features_csv_has_fixed_columns_and_empty_nulls() {
        let mut buf = Vec::new();
        write_csv(&[row("x.py", Some(5)), row("y.py", None)], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "file,commit_count,unique_authors,last_modified_days_ago,bug_fix_count,is_buggy",
                "r::x.py,2,2,5,1,1",
                "r::y.py,2,2,,1,1",
            ]
        );
    }

    #[test]
    fn csv_header_carries_feature_columns_in_model_order() {
        let mut buf = Vec::new();
        write_csv(&[row("x.py", Some(5))], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header: Vec<&str> = text.lines().next().unwrap().split(',').collect();

        assert_eq!(header[0], "file");
        assert_eq!(&header[1..=FeatureVector::ARITY], &FEATURE_COLUMNS[..]);
        assert_eq!(header[FeatureVector::ARITY + 1], "is_buggy");
    }

    #[test]
    fn scored_csv_appends_prediction_and_label() {
        let scored = ScoredRow::new(row("x.py", Some(5)), 1, RiskLabel::Medium);
        let mut buf = Vec::new();
        write_csv(&[scored], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("file,commit_count,unique_authors,last_modified_days_ago,bug_fix_count,is_buggy,predicted_buggy,risk_level")
        );
        assert_eq!(lines.next(), Some("r::x.py,2,2,5,1,1,1,Medium"));
    }

    #[test]
    fn ndjson_writes_one_object_per_line() {
        let mut buf = Vec::new();
        write_ndjson(&[row("x.py", None), row("y.py", Some(0))], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let values: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[0]["last_modified_days_ago"].is_null());
        assert_eq!(values[1]["file"], "r::y.py");
    }

    #[test]
    fn empty_table_says_so() {
        let mut buf = Vec::new();
        write_features_table(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No data to display\n");
    }
}
