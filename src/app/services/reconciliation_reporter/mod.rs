//! Audit reporting and the publication verdict
//!
//! Two plain-text reports are produced per run and overwritten every time:
//!
//! - the issue report, one line per diagnostic in discovery order, written
//!   as the run progresses
//! - the table report, written once at the end, listing missing data files
//!   and column discrepancies per table
//!
//! [`ReconciliationReporter::finalize`] returns the
//! [`RunVerdict`](crate::app::models::RunVerdict) that gates publication.

pub mod format;
pub mod reporter;

#[cfg(test)]
mod tests;

pub use reporter::ReconciliationReporter;
