use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while reading, reformatting, or drawing a dump.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("{} not found in {}", path.display(), cwd.display())]
    FileNotFound { path: PathBuf, cwd: PathBuf },
    #[error("line {line}: '{token}' is not a valid integer")]
    Parse { line: usize, token: String },
    #[error("line {line}: expected {expected} fields but found {found}")]
    ColumnCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("no signal named '{0}' in the table")]
    UnknownSignal(String),
    #[error("input names no signals")]
    MissingHeader,
    #[error("signal '{0}' is declared more than once in the header")]
    DuplicateSignal(String),
    #[error("signal '{name}' has {found} samples, expected {expected}")]
    RaggedTable {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("{names} signal names but {columns} sample columns")]
    ShapeMismatch { names: usize, columns: usize },
    #[error("series '{name}' sample {index} is at time {found}, expected {expected}")]
    MisalignedSeries {
        name: String,
        index: usize,
        expected: i64,
        found: i64,
    },
    #[error("invalid signal selection '{spec}': {reason}")]
    InvalidSelection { spec: String, reason: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for DumpError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DumpError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for DumpError {
    fn from(value: image::ImageError) -> Self {
        DumpError::Plot(value.to_string())
    }
}

pub type DumpResult<T> = Result<T, DumpError>;
