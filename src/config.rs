//! Configuration management and validation.
//!
//! Provides the run configuration: which years, counties and tables to
//! enumerate, where source files, canonical field lists and reports live,
//! how source lines are tokenized, and where merged tables are published.
//! Values layer as defaults, then an optional JSON file, then CLI flags.

use crate::app::services::record_parser::{ParseOptions, default_null_values};
use crate::app::services::run_orchestrator::{RunPlan, TableNaming};
use crate::constants::{
    DEFAULT_COUNTIES, DEFAULT_DATA_DIR, DEFAULT_DELIMITER, DEFAULT_FIELDS_DIR, DEFAULT_FIRST_YEAR,
    DEFAULT_LAST_YEAR, DEFAULT_OUTPUT_DIR, DEFAULT_TABLES, ISSUE_REPORT_NAME, PRIMARY_TABLE,
    PRIMARY_TABLE_NAME, TABLE_PREFIX, TABLE_REPORT_NAME,
};
use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for merged tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    /// One `<name>.parquet` file per table in `dir`
    Parquet { dir: PathBuf },
    /// One table per logical table in the SQLite database at `path`
    Sqlite { path: PathBuf },
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::Parquet {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Global configuration for a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Years to enumerate (outer loop)
    pub years: Vec<i32>,

    /// Counties to enumerate (middle loop)
    pub counties: Vec<String>,

    /// Logical tables to enumerate (inner loop)
    pub tables: Vec<String>,

    /// Logical table published under `primary_table_name`
    pub primary_table: String,

    /// External name of the primary table
    pub primary_table_name: String,

    /// Prefix for all other external table names
    pub table_prefix: String,

    /// Root of the extracted source files
    pub data_dir: PathBuf,

    /// Read units straight out of `<county>_<year>_<table>.zip` archives here instead
    pub archive_dir: Option<PathBuf>,

    /// Directory of canonical field-name lists
    pub fields_dir: PathBuf,

    /// Directory receiving both audit reports
    pub report_dir: PathBuf,

    pub issue_report_name: String,

    pub table_report_name: String,

    /// Field delimiter of the source files
    pub delimiter: char,

    /// Field values treated as the absent sentinel
    pub null_values: Vec<String>,

    /// Where merged tables go on a passing run
    pub sink: SinkConfig,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            years: (DEFAULT_FIRST_YEAR..=DEFAULT_LAST_YEAR).collect(),
            counties: DEFAULT_COUNTIES.iter().map(|s| s.to_string()).collect(),
            tables: DEFAULT_TABLES.iter().map(|s| s.to_string()).collect(),
            primary_table: PRIMARY_TABLE.to_string(),
            primary_table_name: PRIMARY_TABLE_NAME.to_string(),
            table_prefix: TABLE_PREFIX.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            archive_dir: None,
            fields_dir: PathBuf::from(DEFAULT_FIELDS_DIR),
            report_dir: PathBuf::from("."),
            issue_report_name: ISSUE_REPORT_NAME.to_string(),
            table_report_name: TABLE_REPORT_NAME.to_string(),
            delimiter: DEFAULT_DELIMITER,
            null_values: default_null_values(),
            sink: SinkConfig::default(),
        }
    }
}

impl ReconcileConfig {
    /// Load a configuration from a JSON file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| ReconcileError::ConfigFile {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Create configuration with custom years
    pub fn with_years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    /// Create configuration with custom counties
    pub fn with_counties(mut self, counties: Vec<String>) -> Self {
        self.counties = counties;
        self
    }

    /// Create configuration with custom tables
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Set the extracted data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Read units from zip archives in `dir`
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Set the canonical field list directory
    pub fn with_fields_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fields_dir = dir.into();
        self
    }

    /// Set the audit report directory
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Set values treated as absent fields
    pub fn with_null_values(mut self, null_values: Vec<String>) -> Self {
        self.null_values = null_values;
        self
    }

    /// Set the publication sink
    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sink = sink;
        self
    }

    pub fn issue_report_path(&self) -> PathBuf {
        self.report_dir.join(&self.issue_report_name)
    }

    pub fn table_report_path(&self) -> PathBuf {
        self.report_dir.join(&self.table_report_name)
    }

    /// Tokenizer settings derived from this configuration
    pub fn parse_options(&self) -> Result<ParseOptions> {
        let delimiter = u8::try_from(self.delimiter).map_err(|_| {
            ReconcileError::configuration(format!(
                "delimiter '{}' must be a single-byte character",
                self.delimiter
            ))
        })?;
        Ok(ParseOptions::new(delimiter).with_null_values(self.null_values.clone()))
    }

    pub fn naming(&self) -> TableNaming {
        TableNaming::new(
            self.primary_table.clone(),
            self.primary_table_name.clone(),
            self.table_prefix.clone(),
        )
    }

    /// Enumeration plan for the orchestrator
    pub fn run_plan(&self) -> Result<RunPlan> {
        self.validate()?;
        Ok(RunPlan {
            years: self.years.clone(),
            counties: self.counties.clone(),
            tables: self.tables.clone(),
            naming: self.naming(),
            parse_options: self.parse_options()?,
        })
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            return Err(ReconcileError::configuration("no years configured"));
        }
        if self.counties.is_empty() {
            return Err(ReconcileError::configuration("no counties configured"));
        }
        if self.tables.is_empty() {
            return Err(ReconcileError::configuration("no tables configured"));
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.as_str()) {
                return Err(ReconcileError::configuration(format!(
                    "table '{}' listed more than once",
                    table
                )));
            }
        }

        if !self.tables.contains(&self.primary_table) {
            return Err(ReconcileError::configuration(format!(
                "primary table '{}' is not among the configured tables",
                self.primary_table
            )));
        }
        if self.table_prefix.is_empty() {
            return Err(ReconcileError::configuration("table prefix must not be empty"));
        }
        if self.issue_report_name == self.table_report_name {
            return Err(ReconcileError::configuration(
                "issue and table reports must use different file names",
            ));
        }

        self.parse_options()?;
        Ok(())
    }
}
