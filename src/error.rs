use thiserror::Error;

pub type Result<T> = std::result::Result<T, BugmapError>;

#[derive(Error, Debug)]
pub enum BugmapError {
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] Box<csv::Error>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Classifier contract violated: {0}")]
    ClassifierContract(String),
}

// Manual From implementation for unboxed to boxed conversion
impl From<csv::Error> for BugmapError {
    fn from(err: csv::Error) -> Self {
        BugmapError::Csv(Box::new(err))
    }
}
