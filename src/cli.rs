use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bugmap")]
#[command(about = "Per-file change-history features and bug-risk triage from commit records")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "JSON array of commit records (default: stdin)")]
    pub input: Option<PathBuf>,

    #[arg(long, global = true, help = "Reference time for file ages (RFC3339, YYYY-MM-DD, or '30 days ago')")]
    pub now: Option<String>,

    #[arg(long, global = true, help = "JSON scoring config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_delimiter = ',', help = "Comma-separated bug keywords (overrides config)")]
    pub keywords: Option<Vec<String>>,

    #[arg(long, global = true, help = "Bug-fix count at which a predicted file is High risk")]
    pub high_risk_threshold: Option<u64>,

    #[arg(long, global = true, help = "Aggregate on all cores", default_value_t = false)]
    pub parallel: bool,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

#[derive(Args, Clone)]
pub struct OutputArgs {
    #[arg(long, help = "Output as JSON", conflicts_with_all = ["ndjson", "csv"])]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON", conflicts_with = "csv")]
    pub ndjson: bool,

    #[arg(long, help = "Output as CSV")]
    pub csv: bool,

    #[arg(long, short, help = "Write to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate commits into one feature row per file
    Features {
        #[clap(flatten)]
        output: OutputArgs,
    },
    /// Classify files and assign High/Medium/Low risk
    Score {
        #[arg(long, help = "JSON array of 0/1 predictions, one per row of the sorted feature CSV")]
        predictions: Option<PathBuf>,

        #[arg(long, help = "Baseline classifier: bug fixes needed to predict buggy", default_value_t = 1)]
        min_bug_fixes: u64,

        #[arg(long, help = "Only emit files with at least this many commits", default_value_t = 0)]
        min_commits: u64,

        #[arg(long, help = "Only emit files predicted buggy")]
        buggy_only: bool,

        #[arg(long, help = "Number of files in the top-risk list", default_value_t = crate::config::TOP_RISKY_FILES)]
        top: usize,

        #[clap(flatten)]
        output: OutputArgs,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::logging::init(self.common.verbose);
        match self.command {
            Commands::Features { output } => crate::features::exec(self.common, output),
            Commands::Score {
                predictions,
                min_bug_fixes,
                min_commits,
                buggy_only,
                top,
                output,
            } => crate::score::exec(
                self.common,
                crate::score::ScoreArgs {
                    predictions,
                    min_bug_fixes,
                    filter: crate::risk::RowFilter { min_commits, buggy_only },
                    top,
                },
                output,
            ),
        }
    }
}
