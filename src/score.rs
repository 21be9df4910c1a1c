use crate::cli::{CommonArgs, OutputArgs};
use crate::export::{self, OutputFormat};
use crate::features::{collect_features, open_output, resolve_config};
use crate::risk::{score, summarize, Classifier, HistoryBaseline, PredictionFile, RowFilter};
use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;

pub struct ScoreArgs {
    pub predictions: Option<PathBuf>,
    pub min_bug_fixes: u64,
    pub filter: RowFilter,
    pub top: usize,
}

pub fn exec(common: CommonArgs, args: ScoreArgs, output: OutputArgs) -> anyhow::Result<()> {
    let config = resolve_config(&common)?;
    let (rows, reference_time) = collect_features(&common, &config)?;

    let classifier: Box<dyn Classifier> = match &args.predictions {
        Some(path) => Box::new(
            PredictionFile::load(path)
                .with_context(|| format!("Failed to load predictions {}", path.display()))?,
        ),
        None => Box::new(HistoryBaseline {
            min_bug_fixes: args.min_bug_fixes,
        }),
    };

    let scored = score(rows, classifier.as_ref(), &config).context("Failed to score files")?;
    let summary = summarize(&scored, args.top);
    let emitted = args.filter.apply(&scored);

    let format = OutputFormat::from_flags(output.json, output.ndjson, output.csv);
    let mut out = open_output(&output)?;
    match format {
        OutputFormat::Json => export::write_score_json(&emitted, &summary, reference_time, &mut out)?,
        OutputFormat::Ndjson => export::write_ndjson(&emitted, &mut out)?,
        OutputFormat::Csv => export::write_csv(&emitted, &mut out)?,
        OutputFormat::Table => export::write_score_table(&emitted, &summary, &mut out)?,
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}
