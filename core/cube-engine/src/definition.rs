//! FILENAME: core/cube-engine/src/definition.rs
//! Cube Definition - The serializable request and configuration.
//!
//! This module contains all the types needed to DESCRIBE a cube calculation.
//! These structures are designed to be:
//! - Serializable (the reporting service builds them from query parameters)
//! - Immutable snapshots handed explicitly into every calculation
//! - Validated once, up front, before any rows are touched

use serde::{Deserialize, Serialize};

use report_model::{DecimalFormat, MAX_PRECISION};

use crate::domain::DimensionDomain;
use crate::error::{CubeError, CubeResult};
use crate::key::validate_dimension_name;

// ============================================================================
// POLICIES
// ============================================================================

/// What to do with a row whose combination is not in the key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnmatchedRowPolicy {
    /// Abort the calculation.
    Reject,
    /// Drop the row and log a warning. Must be chosen explicitly.
    SkipWithWarning,
}

impl Default for UnmatchedRowPolicy {
    fn default() -> Self {
        UnmatchedRowPolicy::Reject
    }
}

/// How the total column and the totals row are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalsMode {
    /// Totals are exact sums (cost reports).
    Sum,
    /// Totals are means over the non-zero cells (uptime reports).
    Average,
}

impl Default for TotalsMode {
    fn default() -> Self {
        TotalsMode::Sum
    }
}

/// Display order of the surviving rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOrder {
    /// Ascending by combination key.
    Key,
    /// Highest value in the last date bucket first; ties by key.
    LastBucketDescending,
}

impl Default for RowOrder {
    fn default() -> Self {
        RowOrder::Key
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Fixed settings for one calculation. Passed explicitly, never global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Fractional digits of every rendered cell (4 renders zero as `"0.0000"`).
    pub precision: u32,

    /// Upper bound on the generated key space.
    pub max_combinations: usize,

    pub unmatched_rows: UnmatchedRowPolicy,

    pub totals_mode: TotalsMode,

    /// Name of the per-row total column.
    pub total_column: String,

    /// Label-only columns added blank to every row (e.g. `"trend"`).
    pub extra_columns: Vec<String>,

    pub row_order: RowOrder,
}

impl CubeConfig {
    pub const DEFAULT_MAX_COMBINATIONS: usize = 250_000;

    pub fn from_json(json: &str) -> CubeResult<Self> {
        let config: CubeConfig =
            serde_json::from_str(json).map_err(|e| CubeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn decimal_format(&self) -> CubeResult<DecimalFormat> {
        Ok(DecimalFormat::new(self.precision)?)
    }

    pub fn validate(&self) -> CubeResult<()> {
        if self.precision > MAX_PRECISION {
            return Err(CubeError::InvalidConfig(format!(
                "precision {} exceeds {}",
                self.precision, MAX_PRECISION
            )));
        }
        if self.max_combinations == 0 {
            return Err(CubeError::InvalidConfig(
                "max_combinations must be at least 1".to_string(),
            ));
        }
        if self.total_column.is_empty() {
            return Err(CubeError::InvalidConfig(
                "total_column must not be empty".to_string(),
            ));
        }

        let mut seen = vec![self.total_column.as_str()];
        for column in &self.extra_columns {
            if column.is_empty() {
                return Err(CubeError::InvalidConfig(
                    "extra column names must not be empty".to_string(),
                ));
            }
            if seen.contains(&column.as_str()) {
                return Err(CubeError::ColumnCollision(column.clone()));
            }
            seen.push(column.as_str());
        }
        Ok(())
    }

    /// Columns that hold no dimension or bucket data.
    pub(crate) fn label_columns(&self) -> impl Iterator<Item = &str> {
        self.extra_columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.total_column.as_str()))
    }
}

impl Default for CubeConfig {
    fn default() -> Self {
        CubeConfig {
            precision: DecimalFormat::DEFAULT_PRECISION,
            max_combinations: Self::DEFAULT_MAX_COMBINATIONS,
            unmatched_rows: UnmatchedRowPolicy::default(),
            totals_mode: TotalsMode::default(),
            total_column: "total".to_string(),
            extra_columns: Vec::new(),
            row_order: RowOrder::default(),
        }
    }
}

// ============================================================================
// CUBE DEFINITION
// ============================================================================

/// What to pivot: the dimensions and the complete bucket range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeDefinition {
    /// Pivot dimensions. Order and duplicates do not matter.
    pub dimensions: Vec<String>,

    /// Complete, ordered date bucket labels (e.g. every month in the range).
    pub buckets: Vec<String>,

    /// Distinct values per dimension as known by the query layer.
    /// When absent, the domain is extracted from the rows.
    #[serde(default)]
    pub domain: Option<DimensionDomain>,
}

impl CubeDefinition {
    pub fn new<D, B>(dimensions: D, buckets: B) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        CubeDefinition {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            buckets: buckets.into_iter().map(Into::into).collect(),
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: DimensionDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Dimensions ascending with duplicates removed; the order keys use.
    pub fn sorted_dimensions(&self) -> Vec<String> {
        let mut dims = self.dimensions.clone();
        dims.sort();
        dims.dedup();
        dims
    }

    /// Checks names and that no column would appear twice in a row.
    pub fn validate(&self, config: &CubeConfig) -> CubeResult<()> {
        let dimensions = self.sorted_dimensions();
        for name in &dimensions {
            validate_dimension_name(name)?;
            if config.label_columns().any(|c| c == name.as_str()) {
                return Err(CubeError::ColumnCollision(name.clone()));
            }
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.buckets.len());
        for bucket in &self.buckets {
            if seen.contains(&bucket.as_str()) {
                return Err(CubeError::DuplicateBucket(bucket.clone()));
            }
            if dimensions.contains(bucket) || config.label_columns().any(|c| c == bucket.as_str()) {
                return Err(CubeError::ColumnCollision(bucket.clone()));
            }
            seen.push(bucket.as_str());
        }

        if let Some(domain) = &self.domain {
            domain.ensure_dimensions(&dimensions)?;
        }
        Ok(())
    }
}
