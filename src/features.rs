use crate::aggregate::{aggregate, aggregate_parallel};
use crate::cli::{CommonArgs, OutputArgs};
use crate::config::ScoringConfig;
use crate::export::{self, OutputFormat};
use crate::input::load_commits;
use crate::model::FileFeatureRow;
use crate::util::parse_reference_time;
use anyhow::Context;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub fn exec(common: CommonArgs, output: OutputArgs) -> anyhow::Result<()> {
    let config = resolve_config(&common)?;
    let (rows, reference_time) = collect_features(&common, &config)?;
    let format = OutputFormat::from_flags(output.json, output.ndjson, output.csv);
    let mut out = open_output(&output)?;

    match format {
        OutputFormat::Json => export::write_features_json(&rows, reference_time, &mut out)?,
        OutputFormat::Ndjson => export::write_ndjson(&rows, &mut out)?,
        OutputFormat::Csv => export::write_csv(&rows, &mut out)?,
        OutputFormat::Table => export::write_features_table(&rows, &mut out)?,
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}

pub fn resolve_config(common: &CommonArgs) -> anyhow::Result<ScoringConfig> {
    let mut config = match &common.config {
        Some(path) => ScoringConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScoringConfig::default(),
    };
    if let Some(keywords) = &common.keywords {
        config = config.with_keywords(keywords.iter().cloned());
    }
    if let Some(threshold) = common.high_risk_threshold {
        config = config.with_high_risk_threshold(threshold);
    }
    config.validated().context("Invalid scoring configuration")
}

// Sorted by file key so a predictions file lines up with the CSV rows.
pub fn collect_features(
    common: &CommonArgs,
    config: &ScoringConfig,
) -> anyhow::Result<(Vec<FileFeatureRow>, DateTime<Utc>)> {
    let reference_time = match &common.now {
        Some(raw) => parse_reference_time(raw, Utc::now()).context("Failed to resolve --now")?,
        None => Utc::now(),
    };

    let commits = load_commits(common.input.as_ref()).context("Failed to load commit records")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Aggregating {} commits...", commits.len()));

    let mut rows = if common.parallel {
        aggregate_parallel(&commits, reference_time, config)
    } else {
        aggregate(&commits, reference_time, config)
    };
    rows.sort_by(|a, b| a.file.cmp(&b.file));

    pb.finish_and_clear();
    Ok((rows, reference_time))
}

pub fn open_output(output: &OutputArgs) -> anyhow::Result<Box<dyn Write>> {
    Ok(match &output.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}
