//! Streaming issue report and end-of-run table report

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use super::format::{issue_line, problematic_rows_header, table_report};
use crate::app::models::{ColumnDiscrepancy, Diagnostic, RunVerdict, UnitKey};
use crate::error::Result;

/// Writes both audit reports and decides the run verdict
pub struct ReconciliationReporter<I: Write, T: Write> {
    issues: I,
    table_report: T,
    /// Unit whose problematic-rows block is currently open
    open_block: Option<UnitKey>,
    issues_recorded: usize,
}

impl ReconciliationReporter<BufWriter<File>, BufWriter<File>> {
    /// Create (or truncate) both report files
    pub fn create(issue_path: &Path, table_path: &Path) -> Result<Self> {
        for path in [issue_path, table_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let issues = BufWriter::new(File::create(issue_path)?);
        let table_report = BufWriter::new(File::create(table_path)?);
        debug!(
            "Writing reports to {} and {}",
            issue_path.display(),
            table_path.display()
        );
        Ok(Self::new(issues, table_report))
    }
}

impl<I: Write, T: Write> ReconciliationReporter<I, T> {
    pub fn new(issues: I, table_report: T) -> Self {
        Self {
            issues,
            table_report,
            open_block: None,
            issues_recorded: 0,
        }
    }

    pub fn issues_recorded(&self) -> usize {
        self.issues_recorded
    }

    /// Append one diagnostic to the issue report
    ///
    /// Consecutive problematic rows of the same file share one
    /// `Problematic rows in file ...:` header.
    pub fn record_issue(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        let line = issue_line(diagnostic);

        match diagnostic {
            Diagnostic::ProblematicRow { unit, .. } => {
                if self.open_block.as_ref() != Some(unit) {
                    writeln!(self.issues, "{}", problematic_rows_header(unit))?;
                    self.open_block = Some(unit.clone());
                }
                debug!("{}: {}", unit, line);
            }
            _ => {
                self.open_block = None;
                warn!("{}", line);
            }
        }

        writeln!(self.issues, "{}", line)?;
        self.issues_recorded += 1;
        Ok(())
    }

    /// Write the table report and return the verdict
    ///
    /// FAIL when any data file is missing or any discrepancy was found.
    pub fn finalize(
        mut self,
        missing_files: &[String],
        discrepancies: &[ColumnDiscrepancy],
    ) -> Result<RunVerdict> {
        self.issues.flush()?;

        self.table_report
            .write_all(table_report(missing_files, discrepancies).as_bytes())?;
        self.table_report.flush()?;

        let verdict = RunVerdict::from_findings(missing_files, discrepancies);
        if verdict.is_pass() {
            info!(
                "Reconciliation passed ({} issues recorded)",
                self.issues_recorded
            );
        } else {
            warn!(
                "Reconciliation failed: {} missing files, {} column discrepancies",
                missing_files.len(),
                discrepancies.len()
            );
        }
        Ok(verdict)
    }
}
