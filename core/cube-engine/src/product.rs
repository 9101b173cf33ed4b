//! FILENAME: core/cube-engine/src/product.rs
//! Cartesian product of dimension domains.
//!
//! The generated key space has `|d1| * |d2| * ... * |dn|` entries. That product
//! is the dominant cost of a whole cube calculation (memory and time), which is
//! why it is checked against a hard limit before anything is allocated.

use smallvec::SmallVec;

use crate::domain::DimensionDomain;
use crate::error::{CubeError, CubeResult};
use crate::key::CombinationKey;

/// Fails if the domain would expand to more than `limit` combinations.
pub fn check_key_space(domain: &DimensionDomain, limit: usize) -> CubeResult<usize> {
    let size = domain.key_space_size();
    if size > limit as u128 {
        return Err(CubeError::KeySpaceTooLarge { size, limit });
    }
    Ok(size as usize)
}

/// Every combination that picks exactly one value per dimension.
///
/// - No dimensions: exactly one (empty) combination.
/// - Any dimension with no values: no combinations at all.
///
/// Keys come out in odometer order: the last dimension (by name) varies
/// fastest, and each dimension walks its values in ascending order.
pub fn cartesian_keys(domain: &DimensionDomain, limit: usize) -> CubeResult<Vec<CombinationKey>> {
    let size = check_key_space(domain, limit)?;
    let axes: Vec<(&str, &[String])> = domain.iter().collect();

    let mut keys = Vec::with_capacity(size);
    if size == 0 {
        return Ok(keys);
    }

    let mut cursor = vec![0usize; axes.len()];
    loop {
        let pairs: SmallVec<[(String, String); 4]> = axes
            .iter()
            .zip(&cursor)
            .map(|((name, values), &idx)| (name.to_string(), values[idx].clone()))
            .collect();
        keys.push(CombinationKey::from_sorted(pairs));

        // Advance the odometer, carrying into earlier dimensions
        let mut level = axes.len();
        loop {
            if level == 0 {
                return Ok(keys);
            }
            level -= 1;
            cursor[level] += 1;
            if cursor[level] < axes[level].1.len() {
                break;
            }
            cursor[level] = 0;
        }
    }
}
