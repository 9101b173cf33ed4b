//! FILENAME: core/report-model/src/lib.rs
//! PURPOSE: Main library entry point for the report value types.
//! CONTEXT: Re-exports the row and amount types shared by the cube engine and
//! whatever service feeds it.

pub mod amount;
pub mod error;
pub mod row;

// Re-export commonly used types at the crate root
pub use amount::{Amount, DecimalFormat, MAX_PRECISION};
pub use error::ModelError;
pub use row::MeasurementRow;
