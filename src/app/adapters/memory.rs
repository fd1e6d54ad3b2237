//! In-memory collaborators for driving the engine without a filesystem

use std::collections::HashMap;
use std::io::Read;

use super::file_provider::FileProvider;
use super::schema_lookup::SchemaLookup;
use super::sink::TableSink;
use crate::app::models::{CanonicalSchema, UnitKey};
use crate::app::services::table_merger::TableDataset;
use crate::error::Result;

/// Unit contents held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryFiles {
    files: HashMap<UnitKey, Vec<u8>>,
}

impl InMemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, unit: UnitKey, content: impl Into<Vec<u8>>) -> Self {
        self.insert(unit, content);
        self
    }

    pub fn insert(&mut self, unit: UnitKey, content: impl Into<Vec<u8>>) {
        self.files.insert(unit, content.into());
    }
}

impl FileProvider for InMemoryFiles {
    fn fetch(&self, unit: &UnitKey) -> Result<Option<Box<dyn Read + '_>>> {
        Ok(self
            .files
            .get(unit)
            .map(|content| Box::new(content.as_slice()) as Box<dyn Read + '_>))
    }
}

/// Field lists held in memory, optionally overridden per year
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemas {
    tables: HashMap<String, Vec<String>>,
    year_tables: HashMap<(String, i32), Vec<String>>,
}

impl InMemorySchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table<S: AsRef<str>>(mut self, table: &str, fields: &[S]) -> Self {
        self.tables.insert(
            table.to_string(),
            fields.iter().map(|f| f.as_ref().to_string()).collect(),
        );
        self
    }

    pub fn with_table_for_year<S: AsRef<str>>(
        mut self,
        table: &str,
        year: i32,
        fields: &[S],
    ) -> Self {
        self.year_tables.insert(
            (table.to_string(), year),
            fields.iter().map(|f| f.as_ref().to_string()).collect(),
        );
        self
    }
}

impl SchemaLookup for InMemorySchemas {
    fn get(&self, table: &str) -> Result<Option<CanonicalSchema>> {
        self.tables
            .get(table)
            .map(|fields| CanonicalSchema::new(table, fields))
            .transpose()
    }

    fn lookup(&self, unit: &UnitKey) -> Result<Option<CanonicalSchema>> {
        match self.year_tables.get(&(unit.table.clone(), unit.year)) {
            Some(fields) => CanonicalSchema::new(&unit.table, fields).map(Some),
            None => self.get(&unit.table),
        }
    }
}

/// Keeps published tables, replacing on republish
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: Vec<(String, TableDataset)>,
    /// Publishes of an open group, applied on commit
    pending: Option<Vec<(String, TableDataset)>>,
    publish_calls: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&TableDataset> {
        self.tables
            .iter()
            .find(|(published, _)| published == name)
            .map(|(_, dataset)| dataset)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn publish_calls(&self) -> usize {
        self.publish_calls
    }

    fn replace(&mut self, name: String, dataset: TableDataset) {
        self.tables.retain(|(published, _)| *published != name);
        self.tables.push((name, dataset));
    }
}

impl TableSink for MemorySink {
    fn begin(&mut self) -> Result<()> {
        self.pending = Some(Vec::new());
        Ok(())
    }

    fn publish(&mut self, name: &str, dataset: &TableDataset) -> Result<()> {
        self.publish_calls += 1;
        match self.pending.as_mut() {
            Some(pending) => pending.push((name.to_string(), dataset.clone())),
            None => self.replace(name.to_string(), dataset.clone()),
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        for (name, dataset) in self.pending.take().unwrap_or_default() {
            self.replace(name, dataset);
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.pending = None;
        Ok(())
    }
}
