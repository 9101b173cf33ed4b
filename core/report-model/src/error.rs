//! FILENAME: core/report-model/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid decimal value: '{0}'")]
    InvalidDecimal(String),

    #[error("Decimal overflow while combining {left} and {right}")]
    Overflow { left: String, right: String },

    #[error("Cannot average over zero values")]
    EmptyAverage,

    #[error("Precision {0} exceeds the maximum supported scale of 28")]
    PrecisionTooLarge(u32),

    #[error("Record is missing field '{0}'")]
    MissingField(String),
}
