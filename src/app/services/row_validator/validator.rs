//! Field-count validation

use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::models::{CanonicalSchema, Diagnostic, RawRow, Record, UnitKey};

/// Records that passed validation and diagnostics for the rows that did not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationOutcome {
    pub fn rejected(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Validates raw rows of one unit against its canonical schema
#[derive(Debug, Clone)]
pub struct RowValidator {
    schema: Arc<CanonicalSchema>,
}

impl RowValidator {
    pub fn new(schema: Arc<CanonicalSchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    /// Whether a row maps 1:1 onto the schema
    ///
    /// Only present fields count; a row is accepted when it has exactly one
    /// slot per field and every slot is present.
    pub fn is_well_formed(&self, row: &RawRow) -> bool {
        row.fields.len() == self.schema.len() && row.present_count() == self.schema.len()
    }

    /// Partition rows into records and `ProblematicRow` diagnostics, preserving order
    pub fn validate(&self, unit: &UnitKey, rows: Vec<RawRow>) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();

        for row in rows {
            if !self.is_well_formed(&row) {
                outcome.diagnostics.push(Diagnostic::ProblematicRow {
                    unit: unit.clone(),
                    row_number: row.row_number,
                    values: row.fields,
                });
                continue;
            }

            let values = row.fields.into_iter().flatten().collect();
            if let Some(record) = Record::try_new(Arc::clone(&self.schema), values) {
                outcome.records.push(record);
            }
        }

        if !outcome.diagnostics.is_empty() {
            warn!(
                "{} problematic rows in {} (expected {} fields)",
                outcome.diagnostics.len(),
                unit,
                self.schema.len()
            );
        }
        debug!("Validated {} records for {}", outcome.records.len(), unit);

        outcome
    }
}
