//! Test utilities for run orchestration

use crate::app::adapters::{FileProvider, InMemorySchemas, MemorySink, SchemaLookup, TableSink};
use crate::app::models::RunOutcome;
use crate::app::services::reconciliation_reporter::ReconciliationReporter;
use crate::app::services::run_orchestrator::{RunOrchestrator, RunPlan};
use crate::app::services::table_merger::TableDataset;
use crate::error::{ReconcileError, Result};

mod orchestrator_tests;

pub fn plan(years: &[i32], counties: &[&str], tables: &[&str]) -> RunPlan {
    RunPlan::new(
        years.to_vec(),
        counties.iter().map(|c| c.to_string()).collect(),
        tables.iter().map(|t| t.to_string()).collect(),
    )
}

pub fn accident_schemas() -> InMemorySchemas {
    InMemorySchemas::new()
        .with_table("Accidents", &["a", "b", "c"])
        .with_table("Drivers", &["id", "age"])
}

/// Reports captured from one run
pub struct CapturedRun {
    pub outcome: RunOutcome,
    pub issues: String,
    pub table_report: String,
}

pub fn run(
    orchestrator: &RunOrchestrator,
    schemas: &dyn SchemaLookup,
    files: &dyn FileProvider,
    sink: &mut dyn TableSink,
) -> CapturedRun {
    let (outcome, issues, table_report) = try_run(orchestrator, schemas, files, sink);

    CapturedRun {
        outcome: outcome.unwrap(),
        issues,
        table_report,
    }
}

/// Run and return the result with whatever the reports received
pub fn try_run(
    orchestrator: &RunOrchestrator,
    schemas: &dyn SchemaLookup,
    files: &dyn FileProvider,
    sink: &mut dyn TableSink,
) -> (Result<RunOutcome>, String, String) {
    let mut issues = Vec::new();
    let mut table_report = Vec::new();
    let reporter = ReconciliationReporter::new(&mut issues, &mut table_report);

    let outcome = orchestrator.run_once(schemas, files, sink, reporter);

    (
        outcome,
        String::from_utf8(issues).unwrap(),
        String::from_utf8(table_report).unwrap(),
    )
}

/// Memory sink that refuses to publish one table
pub struct FailingSink {
    pub inner: MemorySink,
    pub fail_on: String,
}

impl FailingSink {
    pub fn new(inner: MemorySink, fail_on: &str) -> Self {
        Self {
            inner,
            fail_on: fail_on.to_string(),
        }
    }
}

impl TableSink for FailingSink {
    fn begin(&mut self) -> Result<()> {
        self.inner.begin()
    }

    fn publish(&mut self, name: &str, dataset: &TableDataset) -> Result<()> {
        if name == self.fail_on {
            return Err(ReconcileError::publish(name, "disk full"));
        }
        self.inner.publish(name, dataset)
    }

    fn commit(&mut self) -> Result<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.rollback()
    }
}
