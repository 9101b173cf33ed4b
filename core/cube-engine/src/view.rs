//! FILENAME: core/cube-engine/src/view.rs
//! Cube View - Renderable output for the presentation layer.
//!
//! Every cell is already a formatted string and every row has the same column
//! set, so the table can be serialized to JSON and rendered as is:
//!
//! ```json
//! {
//!   "headers": ["team", "2024-01", "2024-02", "total"],
//!   "dimensions": ["team"],
//!   "buckets": ["2024-01", "2024-02"],
//!   "rows": {"team:a^": {"team": "a", "2024-01": "1.0000", "2024-02": "0.0000", "total": "1.0000"}},
//!   "order": ["team:a^"],
//!   "totals": {"team": "", "2024-01": "1.0000", "2024-02": "0.0000", "total": "1.0000"}
//! }
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use report_model::Amount;
use serde::{Deserialize, Serialize};

use crate::definition::RowOrder;
use crate::key::CombinationKey;

// ============================================================================
// DENSE ROW
// ============================================================================

/// Column name -> formatted cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DenseRow {
    cells: BTreeMap<String, String>,
}

impl DenseRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Column names, ascending.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.cells
    }

    pub(crate) fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Numeric value of a cell; blank or missing cells read as zero.
    fn amount(&self, column: &str) -> Amount {
        self.get(column)
            .map(trim_fraction_padding)
            .and_then(|cell| Amount::parse(cell).ok())
            .unwrap_or_default()
    }
}

/// Drops the trailing fractional zeros a wide cell is padded with, so the text
/// fits the decimal type again when read back.
fn trim_fraction_padding(cell: &str) -> &str {
    if cell.contains('.') {
        cell.trim_end_matches('0').trim_end_matches('.')
    } else {
        cell
    }
}

// ============================================================================
// DENSE TABLE
// ============================================================================

/// The finished cube: one row per observed combination plus a totals row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseTable {
    /// Render order of columns: dimensions, buckets, extra columns, total.
    pub headers: Vec<String>,

    /// Dimension names, ascending.
    pub dimensions: Vec<String>,

    /// Bucket labels in the order they were requested.
    pub buckets: Vec<String>,

    pub rows: BTreeMap<CombinationKey, DenseRow>,

    /// Display order of `rows`.
    pub order: Vec<CombinationKey>,

    pub totals: DenseRow,
}

impl DenseTable {
    /// Number of data rows (the totals row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &CombinationKey) -> Option<&DenseRow> {
        self.rows.get(key)
    }

    /// Looks a row up by its wire-form key.
    pub fn get_encoded(&self, key: &str) -> Option<&DenseRow> {
        CombinationKey::decode(key)
            .ok()
            .and_then(|key| self.rows.get(&key))
    }

    /// Rows in display order.
    pub fn ordered_rows(&self) -> impl Iterator<Item = (&CombinationKey, &DenseRow)> {
        self.order
            .iter()
            .filter_map(move |key| self.rows.get_key_value(key))
    }

    /// Rows sorted by the given order.
    pub fn sorted_rows(&self, order: RowOrder) -> Vec<(&CombinationKey, &DenseRow)> {
        let mut rows: Vec<(&CombinationKey, &DenseRow)> = self.rows.iter().collect();
        // BTreeMap iteration is already key order
        if let (RowOrder::LastBucketDescending, Some(last)) = (order, self.buckets.last()) {
            rows.sort_by(|a, b| match b.1.amount(last).cmp(&a.1.amount(last)) {
                Ordering::Equal => a.0.cmp(b.0),
                other => other,
            });
        }
        rows
    }

    /// Flattens the table into one record per row and non-zero bucket, with the
    /// bucket label under `date_column` and the cell under `value_column`.
    pub fn long_rows(&self, date_column: &str, value_column: &str) -> Vec<BTreeMap<String, String>> {
        let mut out = Vec::new();
        for (key, row) in &self.rows {
            for bucket in &self.buckets {
                if row.amount(bucket).is_zero() {
                    continue;
                }
                let mut record: BTreeMap<String, String> = key
                    .pairs()
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                record.insert(date_column.to_string(), bucket.clone());
                record.insert(
                    value_column.to_string(),
                    row.get(bucket).unwrap_or_default().to_string(),
                );
                out.push(record);
            }
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
