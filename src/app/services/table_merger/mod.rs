//! Table merging across units
//!
//! Folds each unit's validated records into one growing dataset per logical
//! table. Column drift between units is tolerated: the records are appended
//! regardless, and a [`ColumnDiscrepancy`](crate::app::models::ColumnDiscrepancy)
//! is raised for human review whenever a unit lacks columns the dataset
//! already has.

pub mod dataset;
pub mod merger;

#[cfg(test)]
mod tests;

pub use dataset::TableDataset;
pub use merger::TableMerger;
