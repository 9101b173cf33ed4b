//! FILENAME: core/cube-engine/src/error.rs

use report_model::ModelError;
use thiserror::Error;

pub type CubeResult<T> = Result<T, CubeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("Dimension name '{0}' contains a reserved character (':' or '^')")]
    ReservedInName(String),

    #[error("Value '{value}' of dimension '{dimension}' contains a reserved character (':' or '^')")]
    ReservedInValue { dimension: String, value: String },

    #[error("Dimension names must not be empty")]
    EmptyDimensionName,

    #[error("Dimension '{0}' appears more than once in one key")]
    DuplicateDimension(String),

    #[error("Malformed combination key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("Supplied domain does not match the pivot dimensions (at '{0}')")]
    DomainMismatch(String),

    #[error("Date bucket '{0}' is listed more than once")]
    DuplicateBucket(String),

    #[error("Column '{0}' would appear twice in every row")]
    ColumnCollision(String),

    #[error("Key space of {size} combinations exceeds the limit of {limit}")]
    KeySpaceTooLarge { size: u128, limit: usize },

    #[error("Row '{key}' has invalid value '{value}' for bucket '{bucket}'")]
    InvalidValue {
        key: String,
        bucket: String,
        value: String,
        #[source]
        source: ModelError,
    },

    #[error("Row '{key}' targets bucket '{bucket}' outside the requested range")]
    UnknownBucket { key: String, bucket: String },

    #[error("Row '{0}' does not match any combination in the computed domain")]
    UnmatchedRow(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
