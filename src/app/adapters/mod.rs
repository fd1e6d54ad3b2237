//! Adapters to the engine's external collaborators
//!
//! The reconciliation core only sees three seams:
//!
//! - [`FileProvider`] yields the raw bytes of one unit, or nothing
//! - [`SchemaLookup`] yields a table's canonical field names, or nothing
//! - [`TableSink`] receives a merged table, replacing what was there
//!
//! Filesystem, zip archive, Parquet and SQLite implementations live here
//! alongside in-memory ones used to exercise the engine in isolation.

pub mod file_provider;
pub mod memory;
pub mod schema_lookup;
pub mod sink;

#[cfg(test)]
mod tests;

pub use file_provider::{ArchiveProvider, DirectoryProvider, FileProvider};
pub use memory::{InMemoryFiles, InMemorySchemas, MemorySink};
pub use schema_lookup::{FieldListDirectory, SchemaLookup};
pub use sink::{DeferredSink, ParquetSink, SqliteSink, TableSink, open_sink};
