//! Run orchestration
//!
//! Drives one full, sequential reconciliation pass:
//!
//! 1. Enumerate every (year, county, table) unit, year outermost
//! 2. Fetch each unit's file and canonical schema, then parse, validate and
//!    merge it, forwarding every diagnostic to the reporter
//! 3. Finalize the reports and obtain the verdict
//! 4. Publish every merged table on PASS; publish nothing on FAIL
//!
//! A unit whose file or schema is absent contributes no records. Nothing from
//! a previous unit is ever carried over.

pub mod naming;
pub mod orchestrator;

#[cfg(test)]
mod tests;

pub use naming::TableNaming;
pub use orchestrator::{RunOrchestrator, RunPlan};
