//! FILENAME: core/cube-engine/src/engine.rs
//! Cube Engine - The calculation core that turns grouped rows into a dense table.
//!
//! This module takes a CubeDefinition (what to pivot), the raw rows and a
//! CubeConfig, and produces a DenseTable ready for rendering.
//!
//! Algorithm:
//! 1. Extract the observed values of every dimension (or take the supplied domain)
//! 2. Expand the domains into the full key space (cartesian product, capped)
//! 3. Build one zero-filled skeleton row per key, one cell per bucket
//! 4. Fold every raw row into its cell by exact decimal addition
//! 5. Prune rows whose cells are all still zero
//! 6. Compute row totals and the totals row

use report_model::{Amount, MeasurementRow};
use rustc_hash::FxHashMap;

use crate::definition::{CubeConfig, CubeDefinition, UnmatchedRowPolicy};
use crate::domain::{extract_domains, DimensionDomain};
use crate::error::{CubeError, CubeResult};
use crate::key::CombinationKey;
use crate::logging::{log_debug, log_enter, log_exit, log_info, log_warn, CUBE};
use crate::product::cartesian_keys;
use crate::totals::calculate_totals;
use crate::view::DenseTable;

// ============================================================================
// SKELETON
// ============================================================================

/// One candidate row: its key and one cell per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonRow {
    pub key: CombinationKey,
    pub cells: Vec<Amount>,
}

impl SkeletonRow {
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Amount::is_zero)
    }
}

/// The zero-filled matrix that rows are folded into.
#[derive(Debug, Clone)]
pub struct Skeleton {
    dimensions: Vec<String>,
    buckets: Vec<String>,
    bucket_index: FxHashMap<String, usize>,
    rows: Vec<SkeletonRow>,
    index: FxHashMap<CombinationKey, usize>,
}

impl Skeleton {
    /// Dimension names, ascending.
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn buckets(&self) -> &[String] {
        &self.buckets
    }

    pub fn rows(&self) -> &[SkeletonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &CombinationKey) -> Option<&SkeletonRow> {
        self.index.get(key).map(|&idx| &self.rows[idx])
    }

    pub fn bucket_position(&self, bucket: &str) -> Option<usize> {
        self.bucket_index.get(bucket).copied()
    }

    /// The key a raw row belongs to. Missing dimensions read as `""`.
    pub fn key_for(&self, row: &MeasurementRow) -> CubeResult<CombinationKey> {
        CombinationKey::new(
            self.dimensions
                .iter()
                .map(|name| (name.as_str(), row.dimension(name))),
        )
    }

    fn reindex(&mut self) {
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.key.clone(), idx))
            .collect();
    }
}

/// Materializes one zero-filled row per combination of the domain.
///
/// Buckets are used exactly as given; the engine never fills in gaps itself.
pub fn build_skeleton(
    domain: &DimensionDomain,
    buckets: &[String],
    config: &CubeConfig,
) -> CubeResult<Skeleton> {
    let mut bucket_index = FxHashMap::default();
    for (idx, bucket) in buckets.iter().enumerate() {
        if bucket_index.insert(bucket.clone(), idx).is_some() {
            return Err(CubeError::DuplicateBucket(bucket.clone()));
        }
    }

    let keys = cartesian_keys(domain, config.max_combinations)?;
    let rows: Vec<SkeletonRow> = keys
        .into_iter()
        .map(|key| SkeletonRow {
            key,
            cells: vec![Amount::ZERO; buckets.len()],
        })
        .collect();

    let mut skeleton = Skeleton {
        dimensions: domain.dimensions().map(str::to_string).collect(),
        buckets: buckets.to_vec(),
        bucket_index,
        rows,
        index: FxHashMap::default(),
    };
    skeleton.reindex();

    log_debug!(
        CUBE,
        "skeleton: {} rows x {} buckets",
        skeleton.len(),
        skeleton.buckets.len()
    );
    Ok(skeleton)
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// How many rows were folded in and how many were dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Adds every row's value into its cell.
///
/// Several rows may target the same cell; their values are summed, never
/// overwritten. Once all rows are in, cells are rounded to the configured
/// precision so later totals add up exactly what gets rendered.
pub fn aggregate_rows(
    skeleton: &mut Skeleton,
    rows: &[MeasurementRow],
    config: &CubeConfig,
) -> CubeResult<AggregateSummary> {
    let format = config.decimal_format()?;
    let mut summary = AggregateSummary::default();

    for row in rows {
        let key = skeleton.key_for(row)?;

        // Bucket and value are checked first so skipping only relaxes the domain
        let col = skeleton
            .bucket_position(&row.bucket)
            .ok_or_else(|| CubeError::UnknownBucket {
                key: key.encode(),
                bucket: row.bucket.clone(),
            })?;

        let value = row.amount().map_err(|source| CubeError::InvalidValue {
            key: key.encode(),
            bucket: row.bucket.clone(),
            value: row.value.clone(),
            source,
        })?;

        let Some(&row_idx) = skeleton.index.get(&key) else {
            match config.unmatched_rows {
                UnmatchedRowPolicy::Reject => {
                    return Err(CubeError::UnmatchedRow(key.encode()));
                }
                UnmatchedRowPolicy::SkipWithWarning => {
                    log_warn!(CUBE, "skipping row '{}': not in the computed domain", key);
                    summary.skipped += 1;
                    continue;
                }
            }
        };

        let cell = &mut skeleton.rows[row_idx].cells[col];
        *cell = cell.checked_add(value)?;
        summary.applied += 1;
    }

    for row in &mut skeleton.rows {
        for cell in &mut row.cells {
            *cell = format.round(*cell);
        }
    }

    Ok(summary)
}

// ============================================================================
// PRUNING
// ============================================================================

/// Drops rows whose bucket cells are all zero. Returns how many were removed.
pub fn prune_empty(skeleton: &mut Skeleton) -> usize {
    let before = skeleton.rows.len();
    skeleton.rows.retain(|row| !row.is_empty());
    let removed = before - skeleton.rows.len();
    if removed > 0 {
        skeleton.reindex();
    }
    removed
}

// ============================================================================
// CUBE CALCULATOR
// ============================================================================

/// Runs the whole pipeline for one request.
pub struct CubeCalculator<'a> {
    definition: &'a CubeDefinition,
    config: &'a CubeConfig,
}

impl<'a> CubeCalculator<'a> {
    pub fn new(definition: &'a CubeDefinition, config: &'a CubeConfig) -> Self {
        CubeCalculator { definition, config }
    }

    /// Executes the full calculation and returns the dense table.
    pub fn calculate(&self, rows: &[MeasurementRow]) -> CubeResult<DenseTable> {
        log_enter!(
            CUBE,
            "calculate",
            "rows={} buckets={}",
            rows.len(),
            self.definition.buckets.len()
        );

        // Step 0: Reject bad requests before touching any rows
        self.config.validate()?;
        self.definition.validate(self.config)?;
        let dimensions = self.definition.sorted_dimensions();

        // Step 1: Domains
        let extracted;
        let domain = match &self.definition.domain {
            Some(supplied) => supplied,
            None => {
                extracted = extract_domains(rows, &dimensions)?;
                &extracted
            }
        };
        log_debug!(
            CUBE,
            "domain over {:?} spans {} combinations",
            dimensions,
            domain.key_space_size()
        );

        // Step 2: Key space + skeleton
        let mut skeleton = build_skeleton(domain, &self.definition.buckets, self.config)?;

        // Step 3: Fold rows in
        let summary = aggregate_rows(&mut skeleton, rows, self.config)?;

        // Step 4: Drop combinations that never occurred
        let pruned = prune_empty(&mut skeleton);

        // Step 5: Totals and rendering
        let table = calculate_totals(&skeleton, self.config)?;

        log_info!(
            CUBE,
            "cube built: {} rows kept, {} pruned, {} source rows applied, {} skipped",
            table.len(),
            pruned,
            summary.applied,
            summary.skipped
        );
        log_exit!(CUBE, "calculate");
        Ok(table)
    }
}

/// Builds the dense table for `rows` as described by `definition`.
pub fn calculate_cube(
    definition: &CubeDefinition,
    rows: &[MeasurementRow],
    config: &CubeConfig,
) -> CubeResult<DenseTable> {
    CubeCalculator::new(definition, config).calculate(rows)
}
