//! FILENAME: core/cube-engine/src/totals.rs
//! Row totals, the totals row, and rendering of the surviving skeleton rows.

use report_model::{Amount, DecimalFormat};

use crate::definition::{CubeConfig, TotalsMode};
use crate::engine::Skeleton;
use crate::error::CubeResult;
use crate::view::{DenseRow, DenseTable};

/// Combines values according to the totals mode.
///
/// `Sum` adds everything. `Average` takes the mean of the non-zero values and
/// is zero when there are none.
pub fn combine<I>(values: I, mode: TotalsMode, format: &DecimalFormat) -> CubeResult<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    match mode {
        TotalsMode::Sum => {
            let mut sum = Amount::ZERO;
            for value in values {
                sum = sum.checked_add(value)?;
            }
            Ok(sum)
        }
        TotalsMode::Average => {
            let mut sum = Amount::ZERO;
            let mut count = 0usize;
            for value in values.into_iter().filter(|v| !v.is_zero()) {
                sum = sum.checked_add(value)?;
                count += 1;
            }
            if count == 0 {
                return Ok(Amount::ZERO);
            }
            Ok(sum.div_count(count, format.precision)?)
        }
    }
}

/// Computes the total column and the totals row, and renders the table.
pub fn calculate_totals(skeleton: &Skeleton, config: &CubeConfig) -> CubeResult<DenseTable> {
    let format = config.decimal_format()?;
    let mode = config.totals_mode;
    let buckets = skeleton.buckets();

    let row_totals = skeleton
        .rows()
        .iter()
        .map(|row| combine(row.cells.iter().copied(), mode, &format))
        .collect::<CubeResult<Vec<_>>>()?;

    let column_totals = (0..buckets.len())
        .map(|col| combine(skeleton.rows().iter().map(|row| row.cells[col]), mode, &format))
        .collect::<CubeResult<Vec<_>>>()?;

    let grand_total = combine(row_totals.iter().copied(), mode, &format)?;

    let mut headers: Vec<String> = skeleton.dimensions().to_vec();
    headers.extend(buckets.iter().cloned());
    headers.extend(config.extra_columns.iter().cloned());
    headers.push(config.total_column.clone());

    let mut table = DenseTable {
        headers,
        dimensions: skeleton.dimensions().to_vec(),
        buckets: buckets.to_vec(),
        ..DenseTable::default()
    };

    for (row, total) in skeleton.rows().iter().zip(&row_totals) {
        let mut dense = DenseRow::default();
        for (name, value) in row.key.pairs() {
            dense.set(name.as_str(), value.as_str());
        }
        for (bucket, cell) in buckets.iter().zip(&row.cells) {
            dense.set(bucket.as_str(), format.format(*cell));
        }
        for extra in &config.extra_columns {
            dense.set(extra.as_str(), "");
        }
        dense.set(config.total_column.as_str(), format.format(*total));
        table.rows.insert(row.key.clone(), dense);
    }

    let mut totals = DenseRow::default();
    for name in skeleton.dimensions() {
        totals.set(name.as_str(), "");
    }
    for (bucket, cell) in buckets.iter().zip(&column_totals) {
        totals.set(bucket.as_str(), format.format(*cell));
    }
    for extra in &config.extra_columns {
        totals.set(extra.as_str(), "");
    }
    totals.set(config.total_column.as_str(), format.format(grand_total));
    table.totals = totals;

    table.order = table
        .sorted_rows(config.row_order)
        .into_iter()
        .map(|(key, _)| key.clone())
        .collect();

    Ok(table)
}
