//! Append-only merging with column drift detection

use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::dataset::TableDataset;
use crate::app::models::{CanonicalSchema, ColumnDiscrepancy, Record, UnitKey};

/// Owns the running dataset of every table for one run
#[derive(Debug, Clone, Default)]
pub struct TableMerger {
    datasets: Vec<TableDataset>,
}

impl TableMerger {
    /// Start a run with an empty dataset per table, in the given order
    pub fn new<S: AsRef<str>>(tables: &[S]) -> Self {
        Self {
            datasets: tables
                .iter()
                .map(|table| TableDataset::new(table.as_ref()))
                .collect(),
        }
    }

    /// Fold one unit's records into its table's dataset
    ///
    /// The first non-empty contribution sets the observed column set. Later
    /// contributions missing any observed column raise a discrepancy; their
    /// records are appended either way. Empty record sets change nothing.
    pub fn merge(
        &mut self,
        table: &str,
        unit: &UnitKey,
        records: Vec<Record>,
    ) -> Option<ColumnDiscrepancy> {
        if records.is_empty() {
            debug!("No records from {} for table {}", unit, table);
            return None;
        }

        let dataset = self.dataset_mut(table);

        let unit_columns: BTreeSet<String> = records
            .iter()
            .flat_map(|record| record.columns())
            .map(str::to_string)
            .collect();
        let missing = dataset.missing_from(&unit_columns);

        let count = records.len();
        dataset.append(records);
        debug!(
            "Merged {} records from {} into {} ({} total)",
            count,
            unit,
            table,
            dataset.len()
        );

        if missing.is_empty() {
            return None;
        }

        let discrepancy = ColumnDiscrepancy::new(table, unit.file_id(), missing);
        warn!(
            "Table {}: {} is missing columns {}",
            table,
            discrepancy.file,
            discrepancy.joined_columns()
        );
        dataset.push_discrepancy(discrepancy.clone());
        Some(discrepancy)
    }

    /// Give a table its column layout before any records arrive
    ///
    /// Does not touch the observed columns, so it never affects discrepancies.
    pub fn declare(&mut self, schema: &CanonicalSchema) {
        self.dataset_mut(schema.table()).declare(schema);
    }

    pub fn dataset(&self, table: &str) -> Option<&TableDataset> {
        self.datasets.iter().find(|dataset| dataset.table() == table)
    }

    pub fn datasets(&self) -> &[TableDataset] {
        &self.datasets
    }

    /// All discrepancies, grouped by table in dataset order
    pub fn discrepancies(&self) -> Vec<ColumnDiscrepancy> {
        self.datasets
            .iter()
            .flat_map(|dataset| dataset.discrepancies().iter().cloned())
            .collect()
    }

    pub fn total_records(&self) -> usize {
        self.datasets.iter().map(TableDataset::len).sum()
    }

    pub fn into_datasets(self) -> Vec<TableDataset> {
        self.datasets
    }

    fn dataset_mut(&mut self, table: &str) -> &mut TableDataset {
        let index = match self
            .datasets
            .iter()
            .position(|dataset| dataset.table() == table)
        {
            Some(index) => index,
            None => {
                self.datasets.push(TableDataset::new(table));
                self.datasets.len() - 1
            }
        };
        &mut self.datasets[index]
    }
}
