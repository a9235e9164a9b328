use thiserror::Error;

/// Failure while loading the dataset. Fatal to the load; the caller keeps
/// whatever table was loaded before and surfaces the message.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: {detail}")]
    Malformed { row: usize, detail: String },
}

impl LoadError {
    pub(crate) fn malformed(row: usize, detail: impl Into<String>) -> Self {
        LoadError::Malformed {
            row,
            detail: detail.into(),
        }
    }
}
