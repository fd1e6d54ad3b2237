//! New Jersey crash data reconciler
//!
//! Parses per-county, per-year crash extract files, validates every row against
//! the canonical field list of its table, merges units into one dataset per
//! table while tracking columns that drift between years, and publishes the
//! merged tables only when the whole run reconciles.
//!
//! This library provides tools for:
//! - Tokenizing loosely-quoted delimited extract files, reporting malformed lines
//! - Rejecting rows whose field count does not match the canonical schema
//! - Merging units per table and detecting column discrepancies
//! - Writing the issue and table audit reports and deciding the run verdict
//! - Publishing merged tables to Parquet files or a SQLite database

pub mod config;
pub mod constants;
pub mod error;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod reconciliation_reporter;
        pub mod record_parser;
        pub mod row_validator;
        pub mod run_orchestrator;
        pub mod table_merger;
    }
    pub mod adapters;
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CanonicalSchema, Diagnostic, Record, RunOutcome, RunVerdict, UnitKey};
pub use app::services::run_orchestrator::{RunOrchestrator, RunPlan};
pub use config::ReconcileConfig;
pub use error::{ReconcileError, Result};
