//! Data models for crash reconciliation
//!
//! This module contains the core data structures flowing through the engine:
//! unit keys identifying one source file, canonical schemas, raw and validated
//! rows, and the run-level verdict and statistics.

pub mod diagnostics;

pub use diagnostics::{ColumnDiscrepancy, Diagnostic, DiagnosticKind};

use crate::constants::{ABSENT_FIELD_MARKER, DATA_FILE_EXTENSION};
use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Unit Key
// =============================================================================

/// One (year, county, table) combination, i.e. one source data file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub year: i32,
    pub county: String,
    pub table: String,
}

impl UnitKey {
    pub fn new(year: i32, county: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            year,
            county: county.into(),
            table: table.into(),
        }
    }

    /// Directory (and archive stem) the state publishes this unit under
    pub fn stem(&self) -> String {
        format!("{}_{}_{}", self.county, self.year, self.table)
    }

    /// Name of the data file inside the unit's directory or archive
    pub fn member_name(&self) -> String {
        format!(
            "{}{}{}.{}",
            self.county, self.year, self.table, DATA_FILE_EXTENSION
        )
    }

    /// Human-readable identifier used in diagnostics and reports
    ///
    /// Relative path of the extracted file, e.g.
    /// `Camden_2019_Drivers/Camden2019Drivers.txt`.
    pub fn file_id(&self) -> String {
        format!("{}/{}", self.stem(), self.member_name())
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_id())
    }
}

/// Enumerate every unit in year-outer, county-middle, table-inner order
pub fn enumerate_units(years: &[i32], counties: &[String], tables: &[String]) -> Vec<UnitKey> {
    let mut units = Vec::with_capacity(years.len() * counties.len() * tables.len());
    for &year in years {
        for county in counties {
            for table in tables {
                units.push(UnitKey::new(year, county.clone(), table.clone()));
            }
        }
    }
    units
}

// =============================================================================
// Canonical Schema
// =============================================================================

/// Authoritative, ordered, lower-cased field names for a logical table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    table: String,
    fields: Vec<String>,
    positions: HashMap<String, usize>,
}

impl CanonicalSchema {
    /// Build a schema, lower-casing names and enforcing non-empty, duplicate-free fields
    pub fn new<I, S>(table: impl Into<String>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = table.into();
        let fields: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .collect();

        if fields.is_empty() {
            return Err(ReconcileError::invalid_schema(table, "no field names"));
        }

        let mut positions = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if field.is_empty() {
                return Err(ReconcileError::invalid_schema(
                    table,
                    format!("field {} has an empty name", index + 1),
                ));
            }
            if positions.insert(field.clone(), index).is_some() {
                return Err(ReconcileError::invalid_schema(
                    table,
                    format!("duplicate field name '{}'", field),
                ));
            }
        }

        Ok(Self {
            table,
            fields,
            positions,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    pub fn field_set(&self) -> BTreeSet<String> {
        self.fields.iter().cloned().collect()
    }
}

// =============================================================================
// Rows and Records
// =============================================================================

/// One tokenized line of a source file, before validation
///
/// `None` marks a field slot carrying the null sentinel; an empty string is
/// still a present value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based position among the rows emitted for the file
    pub row_number: usize,
    /// 1-based physical line in the file
    pub line_number: usize,
    pub fields: Vec<Option<String>>,
}

impl RawRow {
    pub fn new(row_number: usize, line_number: usize, fields: Vec<Option<String>>) -> Self {
        Self {
            row_number,
            line_number,
            fields,
        }
    }

    /// Number of fields that are present (not the null sentinel)
    pub fn present_count(&self) -> usize {
        self.fields.iter().filter(|field| field.is_some()).count()
    }

    /// Field values as written to reports, absent slots shown as `NA`
    pub fn display_values(&self) -> Vec<String> {
        render_values(&self.fields)
    }
}

pub(crate) fn render_values(fields: &[Option<String>]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            field
                .clone()
                .unwrap_or_else(|| ABSENT_FIELD_MARKER.to_string())
        })
        .collect()
}

/// A row mapped 1:1 onto its table's canonical schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<CanonicalSchema>,
    values: Vec<String>,
}

impl Record {
    /// Pair values with a schema; `None` unless there is exactly one value per field
    pub fn try_new(schema: Arc<CanonicalSchema>, values: Vec<String>) -> Option<Self> {
        (values.len() == schema.len()).then_some(Self { schema, values })
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema
            .position(field)
            .map(|index| self.values[index].as_str())
    }

    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.schema.fields().iter().map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Run Outcome
// =============================================================================

/// Why a run was refused publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    MissingDataFile(String),
    ColumnDiscrepancy(ColumnDiscrepancy),
}

/// Run-level pass/fail decision gating publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunVerdict {
    Pass,
    Fail { reasons: Vec<FailureReason> },
}

impl RunVerdict {
    /// Fail when any missing file or column discrepancy was found
    pub fn from_findings(missing_files: &[String], discrepancies: &[ColumnDiscrepancy]) -> Self {
        if missing_files.is_empty() && discrepancies.is_empty() {
            return Self::Pass;
        }

        let reasons = missing_files
            .iter()
            .cloned()
            .map(FailureReason::MissingDataFile)
            .chain(
                discrepancies
                    .iter()
                    .cloned()
                    .map(FailureReason::ColumnDiscrepancy),
            )
            .collect();

        Self::Fail { reasons }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn reasons(&self) -> &[FailureReason] {
        match self {
            Self::Pass => &[],
            Self::Fail { reasons } => reasons,
        }
    }
}

/// Counters accumulated over one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub units_total: usize,
    pub units_processed: usize,
    pub units_missing: usize,
    pub units_empty: usize,
    pub records_merged: usize,
    pub bad_lines: usize,
    pub problematic_rows: usize,
    pub parser_errors: usize,
    pub missing_schemas: usize,
    pub discrepancies: usize,
}

impl RunStats {
    /// Count a diagnostic under its kind
    pub fn observe(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.kind() {
            DiagnosticKind::BadLine => self.bad_lines += 1,
            DiagnosticKind::ProblematicRow => self.problematic_rows += 1,
            DiagnosticKind::ParserError => self.parser_errors += 1,
            DiagnosticKind::MissingSchemaFile => self.missing_schemas += 1,
            DiagnosticKind::MissingDataFile => self.units_missing += 1,
        }
    }

    pub fn total_issues(&self) -> usize {
        self.bad_lines
            + self.problematic_rows
            + self.parser_errors
            + self.missing_schemas
            + self.units_missing
    }
}

/// A table handed to the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedTable {
    pub table: String,
    pub external_name: String,
    pub rows: usize,
}

/// Everything a run produces besides the audit reports
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub verdict: RunVerdict,
    pub stats: RunStats,
    pub published: Vec<PublishedTable>,
    pub elapsed: Duration,
}

impl RunOutcome {
    pub fn is_pass(&self) -> bool {
        self.verdict.is_pass()
    }
}
