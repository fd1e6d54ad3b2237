//! Canonical field-name sources

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app::models::{CanonicalSchema, UnitKey};
use crate::constants::FIELDS_FILE_EXTENSION;
use crate::error::Result;

/// Maps a logical table to its canonical field names
pub trait SchemaLookup {
    /// `Ok(None)` when no field list exists for the table
    fn get(&self, table: &str) -> Result<Option<CanonicalSchema>>;

    /// Schema for one unit; sources with per-year field lists override this
    fn lookup(&self, unit: &UnitKey) -> Result<Option<CanonicalSchema>> {
        self.get(&unit.table)
    }
}

/// Directory of `<Table>.csv` field lists, one field name per line
///
/// A `<Table><year>.csv` list, when present, takes precedence for that year.
#[derive(Debug, Clone)]
pub struct FieldListDirectory {
    dir: PathBuf,
}

impl FieldListDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, FIELDS_FILE_EXTENSION))
    }

    fn read_field_list(&self, table: &str, path: &Path) -> Result<Option<CanonicalSchema>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());
        let schema = CanonicalSchema::new(table, names)?;
        debug!(
            "Loaded {} field names for {} from {}",
            schema.len(),
            table,
            path.display()
        );
        Ok(Some(schema))
    }
}

impl SchemaLookup for FieldListDirectory {
    fn get(&self, table: &str) -> Result<Option<CanonicalSchema>> {
        self.read_field_list(table, &self.path_for(table))
    }

    fn lookup(&self, unit: &UnitKey) -> Result<Option<CanonicalSchema>> {
        let year_path = self.path_for(&format!("{}{}", unit.table, unit.year));
        match self.read_field_list(&unit.table, &year_path)? {
            Some(schema) => Ok(Some(schema)),
            None => self.get(&unit.table),
        }
    }
}
