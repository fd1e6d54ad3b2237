//! Accumulated per-table dataset

use polars::prelude::*;
use std::collections::BTreeSet;

use crate::app::models::{CanonicalSchema, ColumnDiscrepancy, Record};

/// All records merged so far for one logical table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDataset {
    table: String,
    records: Vec<Record>,
    /// Output column order: first-seen across merged units
    columns: Vec<String>,
    /// Canonical fields of the table, the column layout while no records exist
    declared: Vec<String>,
    observed: BTreeSet<String>,
    discrepancies: Vec<ColumnDiscrepancy>,
}

impl TableDataset {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            records: Vec::new(),
            columns: Vec::new(),
            declared: Vec::new(),
            observed: BTreeSet::new(),
            discrepancies: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Output columns; the declared fields until records arrive
    pub fn columns(&self) -> &[String] {
        if self.columns.is_empty() {
            &self.declared
        } else {
            &self.columns
        }
    }

    pub fn observed_columns(&self) -> &BTreeSet<String> {
        &self.observed
    }

    pub fn discrepancies(&self) -> &[ColumnDiscrepancy] {
        &self.discrepancies
    }

    /// Columns already observed that `unit_columns` lacks; empty before the first contribution
    pub(crate) fn missing_from(&self, unit_columns: &BTreeSet<String>) -> BTreeSet<String> {
        self.observed.difference(unit_columns).cloned().collect()
    }

    /// Record the table's canonical fields; the first declaration wins
    pub(crate) fn declare(&mut self, schema: &CanonicalSchema) {
        if self.declared.is_empty() {
            self.declared = schema.fields().to_vec();
        }
    }

    pub(crate) fn append(&mut self, records: Vec<Record>) {
        for record in &records {
            for column in record.columns() {
                if self.observed.insert(column.to_string()) {
                    self.columns.push(column.to_string());
                }
            }
        }
        self.records.extend(records);
    }

    pub(crate) fn push_discrepancy(&mut self, discrepancy: ColumnDiscrepancy) {
        self.discrepancies.push(discrepancy);
    }

    /// Values of one column, `None` for records that lack it
    pub fn column_values(&self, column: &str) -> Vec<Option<String>> {
        self.records
            .iter()
            .map(|record| record.get(column).map(str::to_string))
            .collect()
    }

    /// Materialize as a string-typed DataFrame in first-seen column order
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns()
            .iter()
            .map(|name| Column::new(name.as_str().into(), self.column_values(name)))
            .collect();
        DataFrame::new(columns)
    }
}
