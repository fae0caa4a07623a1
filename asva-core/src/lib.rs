//! ASVA Core - Fundamental types
//!
//! This crate provides the core types used throughout ASVA:
//! - `Cell`, `Dataset`: the observation table, stored column-wise
//! - `GroupSet`, `GroupSamples`: the groups of one grouping column
//! - `PairwiseTable`: pairwise comparison results
//! - `AsvaError`: Structured errors

mod cell;
mod dataset;
mod error;
mod pairwise;

pub use cell::Cell;
pub use dataset::{Column, Dataset, DatasetError, GroupSamples, GroupSet};
pub use error::{codes, AsvaError, AsvaResult, ErrorContext, Severity};
pub use pairwise::{PairwiseRecord, PairwiseTable};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{AsvaError, AsvaResult, Cell, Dataset, GroupSamples, GroupSet, PairwiseTable, Severity};
}
