use thiserror::Error;

#[derive(Error, Debug)]
pub enum RaceSeriesError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Member file not found: {0}")]
    MemberFileNotFound(String),

    #[error("Name corrections file not found: {0}")]
    CorrectionsFileNotFound(String),

    #[error("Race results file not found: {0}")]
    RaceFileNotFound(String),

    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}, line {line}: {message}")]
    InvalidRecord {
        file: String,
        line: u64,
        message: String,
    },

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("No age-grading factors for year {0} (available: 2020)")]
    UnsupportedFactorYear(u16),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] race_series_common::Error),
}

pub type Result<T> = std::result::Result<T, RaceSeriesError>;
