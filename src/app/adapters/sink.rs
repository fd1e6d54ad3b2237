//! Destinations for merged tables

use polars::prelude::{ParquetCompression, ParquetWriter};
use rusqlite::{Connection, params_from_iter};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::app::services::table_merger::TableDataset;
use crate::config::SinkConfig;
use crate::error::{ReconcileError, Result};

/// Receives merged tables; each publish replaces the destination entirely
///
/// Publishes between `begin` and `commit` form one group: either every table
/// of the group is replaced or, after `rollback`, none is. Outside a group
/// each publish stands alone.
pub trait TableSink {
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn publish(&mut self, name: &str, dataset: &TableDataset) -> Result<()>;

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Open the sink described by the configuration
pub fn open_sink(config: &SinkConfig) -> Result<Box<dyn TableSink>> {
    match config {
        SinkConfig::Parquet { dir } => Ok(Box::new(ParquetSink::new(dir.clone()))),
        SinkConfig::Sqlite { path } => Ok(Box::new(SqliteSink::open(path)?)),
    }
}

/// Opens the configured sink on the first `begin` or publish
///
/// A run that never publishes leaves no database or output directory behind.
pub struct DeferredSink {
    config: SinkConfig,
    inner: Option<Box<dyn TableSink>>,
}

impl DeferredSink {
    pub fn new(config: SinkConfig) -> Self {
        Self {
            config,
            inner: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn open(&mut self) -> Result<&mut Box<dyn TableSink>> {
        let sink = match self.inner.take() {
            Some(sink) => sink,
            None => open_sink(&self.config)?,
        };
        Ok(self.inner.insert(sink))
    }
}

impl TableSink for DeferredSink {
    fn begin(&mut self) -> Result<()> {
        self.open()?.begin()
    }

    fn publish(&mut self, name: &str, dataset: &TableDataset) -> Result<()> {
        self.open()?.publish(name, dataset)
    }

    fn commit(&mut self) -> Result<()> {
        match self.inner.as_mut() {
            Some(sink) => sink.commit(),
            None => Ok(()),
        }
    }

    fn rollback(&mut self) -> Result<()> {
        match self.inner.as_mut() {
            Some(sink) => sink.rollback(),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Parquet
// =============================================================================

/// Writes `<dir>/<name>.parquet` per table
///
/// Inside a publish group files are written beside their targets as
/// `<name>.parquet.tmp` and renamed into place on commit. A table without
/// columns has no Parquet form; publishing one removes the target file.
#[derive(Debug, Clone)]
pub struct ParquetSink {
    dir: PathBuf,
    pending: Option<Vec<PendingFile>>,
}

#[derive(Debug, Clone)]
enum PendingFile {
    Replace { staged: PathBuf, target: PathBuf },
    Remove { target: PathBuf },
}

impl ParquetSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pending: None,
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.parquet", name))
    }

    fn staging_path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.parquet.tmp", name))
    }

    fn write(&self, name: &str, dataset: &TableDataset, path: &Path) -> Result<()> {
        let mut df = dataset.to_dataframe()?;
        let file = File::create(path)?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut df)
            .map_err(|e| {
                ReconcileError::publish(name, format!("failed to write {}: {}", path.display(), e))
            })?;
        debug!("Wrote {} rows to {}", df.height(), path.display());
        Ok(())
    }
}

impl PendingFile {
    fn apply(&self) -> Result<()> {
        match self {
            PendingFile::Replace { staged, target } => {
                fs::rename(staged, target)?;
                info!("Published {}", target.display());
            }
            PendingFile::Remove { target } => remove_if_present(target)?,
        }
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl TableSink for ParquetSink {
    fn begin(&mut self) -> Result<()> {
        self.rollback()?;
        self.pending = Some(Vec::new());
        Ok(())
    }

    fn publish(&mut self, name: &str, dataset: &TableDataset) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(name);

        let file = if dataset.columns().is_empty() {
            PendingFile::Remove { target }
        } else {
            let staged = self.staging_path_for(name);
            self.write(name, dataset, &staged)?;
            PendingFile::Replace { staged, target }
        };

        match self.pending.as_mut() {
            Some(pending) => pending.push(file),
            None => file.apply()?,
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        for file in self.pending.take().unwrap_or_default() {
            file.apply()?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        for file in self.pending.take().unwrap_or_default() {
            if let PendingFile::Replace { staged, .. } = file {
                remove_if_present(&staged)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// SQLite
// =============================================================================

/// Publishes each table into a SQLite database as TEXT columns
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        debug!("Opened SQLite database {}", path.display());
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl TableSink for SqliteSink {
    fn begin(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            warn!("Publish group started inside an open transaction; rolling it back");
            self.conn.execute_batch("ROLLBACK")?;
        }
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    fn publish(&mut self, name: &str, dataset: &TableDataset) -> Result<()> {
        let columns = dataset.columns();
        let table = quote_identifier(name);

        // Nests inside an open publish group, or commits on its own
        let savepoint = self.conn.savepoint()?;
        savepoint.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;

        if columns.is_empty() {
            savepoint.commit()?;
            info!("Dropped SQLite table {}: no columns to publish", name);
            return Ok(());
        }

        let column_defs: Vec<String> = columns
            .iter()
            .map(|column| format!("{} TEXT", quote_identifier(column)))
            .collect();
        let column_list: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

        savepoint.execute_batch(&format!(
            "CREATE TABLE {table} ({});",
            column_defs.join(", ")
        ))?;
        {
            let mut insert = savepoint.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                column_list.join(", "),
                placeholders.join(", ")
            ))?;
            for record in dataset.records() {
                let values: Vec<Option<&str>> =
                    columns.iter().map(|column| record.get(column)).collect();
                insert.execute(params_from_iter(values.iter()))?;
            }
        }
        savepoint.commit()?;

        info!("Replaced SQLite table {} with {} rows", name, dataset.len());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}
