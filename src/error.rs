//! Error types.
//!
//! The application layer uses `anyhow`. The pipeline has its own typed error so that callers
//! (the CLI and the MCP server) can tell a broken input file apart from a bad request.

use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the sales pipeline.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PipelineError {
    /// The input file cannot be turned into a dataset.
    DataFormat(DataFormatError),
    /// A request referenced a dimension that does not exist, or exists twice, or is not present
    /// in the table it was applied to. This is a contract violation by the caller.
    InvalidAggregationSpec(String),
}

impl PipelineError {
    pub(crate) fn invalid_spec(message: impl Into<String>) -> Self {
        PipelineError::InvalidAggregationSpec(message.into())
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::DataFormat(e) => write!(f, "Data format error: {e}"),
            PipelineError::InvalidAggregationSpec(s) => {
                write!(f, "Invalid aggregation spec: {s}")
            }
        }
    }
}

impl StdError for PipelineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PipelineError::DataFormat(e) => Some(e),
            PipelineError::InvalidAggregationSpec(_) => None,
        }
    }
}

impl From<DataFormatError> for PipelineError {
    fn from(value: DataFormatError) -> Self {
        PipelineError::DataFormat(value)
    }
}

/// The ways an input file can be malformed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DataFormatError {
    /// A required header is absent from the file.
    MissingColumn(String),
    /// A cell could not be parsed. `line` is the 1-based line in the file, counting the header.
    Unparseable {
        line: u64,
        column: String,
        value: String,
    },
    /// The CSV reader itself failed (I/O, or an unreadable header).
    Csv(String),
}

impl Display for DataFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormatError::MissingColumn(c) => write!(f, "required column '{c}' is missing"),
            DataFormatError::Unparseable {
                line,
                column,
                value,
            } => write!(f, "unable to parse {column} value '{value}' on line {line}"),
            DataFormatError::Csv(s) => write!(f, "{s}"),
        }
    }
}

impl StdError for DataFormatError {}

impl From<csv::Error> for DataFormatError {
    fn from(value: csv::Error) -> Self {
        DataFormatError::Csv(value.to_string())
    }
}
