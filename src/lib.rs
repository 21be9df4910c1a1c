pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod input;
pub mod logging;
pub mod model;
pub mod risk;
pub mod score;
pub mod util;

pub use aggregate::{aggregate, aggregate_parallel, Accumulator};
pub use error::{BugmapError, Result};
pub use model::{CommitRecord, FeatureVector, FileFeatureRow, FileKey, FileStats, RiskLabel, ScoredRow};
pub use risk::{classify, score, Classifier};
