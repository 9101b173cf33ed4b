//! FILENAME: core/cube-engine/src/lib.rs
//! Report cube subsystem.
//!
//! This crate turns grouped report rows (cost, uptime, release cadence...)
//! into dense tables: one row per observed combination of dimension values,
//! one column per requested date bucket, zero-filled, pruned, and totalled.
//! It depends on `report-model` for the row and decimal types.
//!
//! Layers:
//! - `definition`: Serializable request and configuration (what the cube IS)
//! - `domain`, `key`, `product`: Key space construction
//! - `engine`: Skeleton, aggregation and pruning (HOW we calculate)
//! - `totals`: Row and column totals
//! - `view`: Renderable output (WHAT we display)
//!
//! Every call is a pure function of its inputs: nothing is cached or shared,
//! so concurrent requests need no coordination.

mod logging;

pub mod definition;
pub mod domain;
pub mod engine;
pub mod error;
pub mod key;
pub mod product;
pub mod totals;
pub mod view;


pub use definition::*;
pub use domain::{extract_domains, DimensionDomain};
pub use engine::{
    aggregate_rows, build_skeleton, calculate_cube, prune_empty, AggregateSummary,
    CubeCalculator, Skeleton, SkeletonRow,
};
pub use error::{CubeError, CubeResult};
pub use key::CombinationKey;
pub use product::{cartesian_keys, check_key_space};
pub use totals::calculate_totals;
pub use view::{DenseRow, DenseTable};
