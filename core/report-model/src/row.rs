//! FILENAME: core/report-model/src/row.rs
//! PURPOSE: Defines the grouped measurement row handed over by the query layer.
//! CONTEXT: One row is one GROUP BY result: a handful of categorical dimension
//! values, the date bucket it was grouped into, and the aggregated value kept as
//! a decimal string until the cube engine parses it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::ModelError;

/// A single grouped aggregate (e.g. the cost of one team/service in one month).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeasurementRow {
    /// Dimension name -> value, only for the dimensions this row carries.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    /// Date bucket label, already formatted to the caller's granularity.
    pub bucket: String,
    /// Decimal value as text.
    pub value: String,
}

impl MeasurementRow {
    pub fn new(bucket: impl Into<String>, value: impl Into<String>) -> Self {
        MeasurementRow {
            dimensions: BTreeMap::new(),
            bucket: bucket.into(),
            value: value.into(),
        }
    }

    /// Builder-style setter for one dimension value.
    pub fn with(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(dimension.into(), value.into());
        self
    }

    /// Value of a dimension, or the empty string when the row does not carry it.
    pub fn dimension(&self, name: &str) -> &str {
        self.dimensions.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn amount(&self) -> Result<Amount, ModelError> {
        Amount::parse(&self.value)
    }

    /// Splits a flat record (`{"unit": "A", "date": "2024-01", "cost": "1.5"}`)
    /// into a row. Every field other than the bucket and value fields becomes a
    /// dimension.
    pub fn from_record(
        record: &BTreeMap<String, String>,
        bucket_field: &str,
        value_field: &str,
    ) -> Result<Self, ModelError> {
        let bucket = record
            .get(bucket_field)
            .ok_or_else(|| ModelError::MissingField(bucket_field.to_string()))?;
        let value = record
            .get(value_field)
            .ok_or_else(|| ModelError::MissingField(value_field.to_string()))?;

        let dimensions = record
            .iter()
            .filter(|(name, _)| name.as_str() != bucket_field && name.as_str() != value_field)
            .map(|(name, v)| (name.clone(), v.clone()))
            .collect();

        Ok(MeasurementRow {
            dimensions,
            bucket: bucket.clone(),
            value: value.clone(),
        })
    }
}
