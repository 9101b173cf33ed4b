//! FILENAME: core/cube-engine/src/domain.rs
//! Dimension domains - which values each pivot dimension actually takes.
//!
//! By default domains are built from what the rows contain, so unused
//! categories cannot inflate the key space. A caller that already knows the
//! distinct values can hand them in instead; combinations the rows never touch
//! are pruned either way.

use std::collections::{BTreeMap, BTreeSet};

use report_model::MeasurementRow;
use serde::{Deserialize, Serialize};

use crate::error::{CubeError, CubeResult};
use crate::key::{validate_dimension_name, validate_dimension_value};

/// Dimension name -> sorted, de-duplicated values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<String>>", into = "BTreeMap<String, Vec<String>>")]
pub struct DimensionDomain {
    values: BTreeMap<String, Vec<String>>,
}

impl DimensionDomain {
    /// Normalizes caller-supplied value lists (e.g. the query layer's
    /// `column_values`): sorts, de-duplicates and validates every entry.
    pub fn from_values<I, N, V>(columns: I) -> CubeResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut values = BTreeMap::new();
        for (name, candidates) in columns {
            let name = name.into();
            validate_dimension_name(&name)?;

            let mut set = BTreeSet::new();
            for candidate in candidates {
                let candidate = candidate.into();
                validate_dimension_value(&name, &candidate)?;
                set.insert(candidate);
            }
            values
                .entry(name)
                .or_insert_with(BTreeSet::new)
                .extend(set);
        }

        Ok(DimensionDomain {
            values: values
                .into_iter()
                .map(|(name, set)| (name, set.into_iter().collect()))
                .collect(),
        })
    }

    /// Dimension names, ascending.
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self, dimension: &str) -> Option<&[String]> {
        self.values.get(dimension).map(Vec::as_slice)
    }

    /// Per-dimension candidate lists in ascending dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of combinations the cartesian product would generate.
    /// Saturates instead of overflowing.
    pub fn key_space_size(&self) -> u128 {
        self.values
            .values()
            .try_fold(1u128, |acc, values| acc.checked_mul(values.len() as u128))
            .unwrap_or(u128::MAX)
    }

    /// Fails unless this domain covers exactly `dimensions` (sorted, unique).
    pub fn ensure_dimensions(&self, dimensions: &[String]) -> CubeResult<()> {
        for name in dimensions {
            if !self.values.contains_key(name) {
                return Err(CubeError::DomainMismatch(name.clone()));
            }
        }
        if let Some(extra) = self.dimensions().find(|d| !dimensions.iter().any(|n| n.as_str() == *d)) {
            return Err(CubeError::DomainMismatch(extra.to_string()));
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for DimensionDomain {
    type Error = CubeError;

    fn try_from(value: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        DimensionDomain::from_values(value)
    }
}

impl From<DimensionDomain> for BTreeMap<String, Vec<String>> {
    fn from(domain: DimensionDomain) -> Self {
        domain.values
    }
}

/// Collects the observed values of each pivot dimension.
///
/// A row that lacks a dimension contributes the empty string for it, so rows
/// with partial coverage still land in a well-defined combination.
pub fn extract_domains(
    rows: &[MeasurementRow],
    dimensions: &[String],
) -> CubeResult<DimensionDomain> {
    let mut observed: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for name in dimensions {
        validate_dimension_name(name)?;
        observed.entry(name.as_str()).or_default();
    }

    for row in rows {
        for (name, values) in observed.iter_mut() {
            let value = row.dimension(name);
            validate_dimension_value(name, value)?;
            values.insert(value);
        }
    }

    Ok(DimensionDomain {
        values: observed
            .into_iter()
            .map(|(name, values)| {
                (
                    name.to_string(),
                    values.into_iter().map(str::to_string).collect(),
                )
            })
            .collect(),
    })
}
