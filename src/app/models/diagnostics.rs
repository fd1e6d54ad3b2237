//! Diagnostics raised while reconciling a run
//!
//! Every anomaly found in the source data is captured as an immutable
//! [`Diagnostic`] and appended to the issue report in discovery order. Column
//! drift between units of the same table is captured separately as a
//! [`ColumnDiscrepancy`] and summarised in the table report.

use super::UnitKey;
use serde::Serialize;
use std::collections::BTreeSet;

/// Unit-level anomaly; recoverable, never aborts the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Line that could not be tokenized at all
    BadLine {
        unit: UnitKey,
        raw: String,
        reason: String,
    },
    /// Row whose present-field count does not match the canonical schema
    ProblematicRow {
        unit: UnitKey,
        row_number: usize,
        values: Vec<Option<String>>,
    },
    MissingSchemaFile {
        table: String,
    },
    MissingDataFile {
        unit: UnitKey,
    },
    /// The file could not be read through; it contributes no rows
    ParserError {
        unit: UnitKey,
        message: String,
    },
}

/// Discriminant of a [`Diagnostic`], used for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    BadLine,
    ProblematicRow,
    MissingSchemaFile,
    MissingDataFile,
    ParserError,
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::BadLine { .. } => DiagnosticKind::BadLine,
            Self::ProblematicRow { .. } => DiagnosticKind::ProblematicRow,
            Self::MissingSchemaFile { .. } => DiagnosticKind::MissingSchemaFile,
            Self::MissingDataFile { .. } => DiagnosticKind::MissingDataFile,
            Self::ParserError { .. } => DiagnosticKind::ParserError,
        }
    }

    /// Unit the diagnostic refers to, if any
    pub fn unit(&self) -> Option<&UnitKey> {
        match self {
            Self::BadLine { unit, .. }
            | Self::ProblematicRow { unit, .. }
            | Self::MissingDataFile { unit }
            | Self::ParserError { unit, .. } => Some(unit),
            Self::MissingSchemaFile { .. } => None,
        }
    }
}

/// Columns the accumulated dataset already has but a later unit lacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDiscrepancy {
    pub table: String,
    pub file: String,
    pub missing_columns: BTreeSet<String>,
}

impl ColumnDiscrepancy {
    pub fn new(
        table: impl Into<String>,
        file: impl Into<String>,
        missing_columns: BTreeSet<String>,
    ) -> Self {
        Self {
            table: table.into(),
            file: file.into(),
            missing_columns,
        }
    }

    /// Missing columns joined the way the table report prints them
    pub fn joined_columns(&self) -> String {
        self.missing_columns
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
