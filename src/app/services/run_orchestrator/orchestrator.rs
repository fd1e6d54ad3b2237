//! Sequential reconciliation pass

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufReader, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::naming::TableNaming;
use crate::app::adapters::{FileProvider, SchemaLookup, TableSink};
use crate::app::models::{
    CanonicalSchema, Diagnostic, PublishedTable, Record, RunOutcome, RunStats, UnitKey,
    enumerate_units,
};
use crate::app::services::reconciliation_reporter::ReconciliationReporter;
use crate::app::services::record_parser::{ParseOptions, RecordParser};
use crate::app::services::row_validator::RowValidator;
use crate::app::services::table_merger::TableMerger;
use crate::error::Result;

/// What to enumerate and how to name and parse it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub years: Vec<i32>,
    pub counties: Vec<String>,
    pub tables: Vec<String>,
    pub naming: TableNaming,
    pub parse_options: ParseOptions,
}

impl RunPlan {
    pub fn new(years: Vec<i32>, counties: Vec<String>, tables: Vec<String>) -> Self {
        Self {
            years,
            counties,
            tables,
            naming: TableNaming::default(),
            parse_options: ParseOptions::default(),
        }
    }

    pub fn with_naming(mut self, naming: TableNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_parse_options(mut self, parse_options: ParseOptions) -> Self {
        self.parse_options = parse_options;
        self
    }

    /// Every unit, year outermost and table innermost
    pub fn units(&self) -> Vec<UnitKey> {
        enumerate_units(&self.years, &self.counties, &self.tables)
    }
}

/// What one unit contributed
enum UnitContent {
    /// No data file; counts against the verdict
    Missing,
    Records {
        schema: Option<Arc<CanonicalSchema>>,
        records: Vec<Record>,
    },
}

impl UnitContent {
    fn empty() -> Self {
        UnitContent::Records {
            schema: None,
            records: Vec::new(),
        }
    }
}

/// Drives parse, validate, merge, report and publish over a run plan
pub struct RunOrchestrator {
    plan: RunPlan,
    dry_run: bool,
    progress: ProgressBar,
}

impl RunOrchestrator {
    pub fn new(plan: RunPlan) -> Self {
        Self {
            plan,
            dry_run: false,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on the given bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        self.progress = progress;
        self
    }

    /// Compute reports and verdict but never publish
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Load every field list the run will need and fail on any invalid one
    ///
    /// Runs before any unit is read, so a bad field list aborts the run with
    /// nothing written to the reports. Absent field lists are not an error.
    pub fn check_schemas(&self, schemas: &dyn SchemaLookup) -> Result<()> {
        let Some(county) = self.plan.counties.first() else {
            return Ok(());
        };
        for year in &self.plan.years {
            for table in &self.plan.tables {
                schemas.lookup(&UnitKey::new(*year, county.as_str(), table.as_str()))?;
            }
        }
        debug!("Field lists checked for {} tables", self.plan.tables.len());
        Ok(())
    }

    /// Run one full reconciliation pass
    ///
    /// Every run starts from empty datasets. The sink is only called when the
    /// verdict is PASS, and then for every table of the plan in one publish
    /// group, so a table that received no records replaces its previous
    /// contents with an empty table.
    pub fn run_once<I: Write, T: Write>(
        &self,
        schemas: &dyn SchemaLookup,
        files: &dyn FileProvider,
        sink: &mut dyn TableSink,
        mut reporter: ReconciliationReporter<I, T>,
    ) -> Result<RunOutcome> {
        let start_time = Instant::now();
        self.check_schemas(schemas)?;
        let units = self.plan.units();
        info!(
            "Reconciling {} units ({} years x {} counties x {} tables)",
            units.len(),
            self.plan.years.len(),
            self.plan.counties.len(),
            self.plan.tables.len()
        );

        let parser = RecordParser::new(self.plan.parse_options.clone());
        let mut merger = TableMerger::new(&self.plan.tables);
        let mut stats = RunStats {
            units_total: units.len(),
            ..Default::default()
        };
        let mut missing_files = Vec::new();

        self.progress.set_length(units.len() as u64);
        for unit in &units {
            self.progress.set_message(unit.file_id());

            match self.process_unit(unit, schemas, files, &parser, &mut reporter, &mut stats)? {
                UnitContent::Missing => missing_files.push(unit.file_id()),
                UnitContent::Records { schema, records } => {
                    if let Some(schema) = &schema {
                        merger.declare(schema);
                    }
                    stats.units_processed += 1;
                    if records.is_empty() {
                        stats.units_empty += 1;
                        debug!("{} contributed no records", unit);
                    }
                    stats.records_merged += records.len();
                    if merger.merge(&unit.table, unit, records).is_some() {
                        stats.discrepancies += 1;
                    }
                }
            }

            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        let discrepancies = merger.discrepancies();
        let verdict = reporter.finalize(&missing_files, &discrepancies)?;

        let published = if !verdict.is_pass() {
            warn!("Verdict is FAIL; nothing published");
            Vec::new()
        } else if self.dry_run {
            info!("Dry run; nothing published");
            Vec::new()
        } else {
            self.publish(&merger, sink)?
        };

        Ok(RunOutcome {
            verdict,
            stats,
            published,
            elapsed: start_time.elapsed(),
        })
    }

    fn process_unit<I: Write, T: Write>(
        &self,
        unit: &UnitKey,
        schemas: &dyn SchemaLookup,
        files: &dyn FileProvider,
        parser: &RecordParser,
        reporter: &mut ReconciliationReporter<I, T>,
        stats: &mut RunStats,
    ) -> Result<UnitContent> {
        let reader = match files.fetch(unit) {
            Ok(Some(reader)) => reader,
            Ok(None) => {
                emit(
                    reporter,
                    stats,
                    Diagnostic::MissingDataFile { unit: unit.clone() },
                )?;
                return Ok(UnitContent::Missing);
            }
            Err(e) => {
                emit(
                    reporter,
                    stats,
                    Diagnostic::ParserError {
                        unit: unit.clone(),
                        message: format!("could not open file: {}", e),
                    },
                )?;
                return Ok(UnitContent::empty());
            }
        };

        let schema = match schemas.lookup(unit)? {
            Some(schema) => Arc::new(schema),
            None => {
                emit(
                    reporter,
                    stats,
                    Diagnostic::MissingSchemaFile {
                        table: unit.table.clone(),
                    },
                )?;
                return Ok(UnitContent::empty());
            }
        };

        let parsed = parser.parse(unit, BufReader::new(reader));
        for diagnostic in parsed.diagnostics {
            emit(reporter, stats, diagnostic)?;
        }

        let validated = RowValidator::new(Arc::clone(&schema)).validate(unit, parsed.rows);
        for diagnostic in validated.diagnostics {
            emit(reporter, stats, diagnostic)?;
        }

        Ok(UnitContent::Records {
            schema: Some(schema),
            records: validated.records,
        })
    }

    /// Publish every table as one group, rolling the group back on failure
    fn publish(&self, merger: &TableMerger, sink: &mut dyn TableSink) -> Result<Vec<PublishedTable>> {
        sink.begin()?;
        let result = self
            .publish_tables(merger, sink)
            .and_then(|published| sink.commit().map(|()| published));

        if let Err(e) = &result {
            warn!("Publishing failed, rolling back: {}", e);
            if let Err(rollback_error) = sink.rollback() {
                warn!("Rollback failed: {}", rollback_error);
            }
        }
        result
    }

    fn publish_tables(
        &self,
        merger: &TableMerger,
        sink: &mut dyn TableSink,
    ) -> Result<Vec<PublishedTable>> {
        let mut published = Vec::new();

        for dataset in merger.datasets() {
            let external_name = self.plan.naming.external_name(dataset.table());
            if dataset.is_empty() {
                warn!(
                    "Table {} has no records; publishing {} empty",
                    dataset.table(),
                    external_name
                );
            }

            sink.publish(&external_name, dataset)?;
            info!(
                "Published {} as {} ({} rows)",
                dataset.table(),
                external_name,
                dataset.len()
            );
            published.push(PublishedTable {
                table: dataset.table().to_string(),
                external_name,
                rows: dataset.len(),
            });
        }

        Ok(published)
    }
}

fn emit<I: Write, T: Write>(
    reporter: &mut ReconciliationReporter<I, T>,
    stats: &mut RunStats,
    diagnostic: Diagnostic,
) -> Result<()> {
    stats.observe(&diagnostic);
    reporter.record_issue(&diagnostic)
}
