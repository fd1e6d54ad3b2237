//! Tests for Parquet and SQLite sinks

use polars::prelude::*;
use rusqlite::Connection;
use std::fs::File;
use tempfile::TempDir;

use super::{drivers_dataset, empty_drivers_dataset};
use crate::app::adapters::{DeferredSink, ParquetSink, SqliteSink, TableSink, open_sink};
use crate::app::services::table_merger::TableDataset;
use crate::config::SinkConfig;

#[test]
fn test_parquet_sink_writes_table() {
    let dir = TempDir::new().unwrap();
    let mut sink = ParquetSink::new(dir.path().join("out"));

    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();

    let path = sink.path_for("crash_nj_drivers");
    assert!(path.exists());

    let df = ParquetReader::new(File::open(&path).unwrap())
        .finish()
        .unwrap();
    assert_eq!(df.height(), 3);
    let licence = df.column("licence").unwrap().str().unwrap();
    assert_eq!(licence.get(0), Some("L1"));
    assert_eq!(licence.get(2), None);
}

#[test]
fn test_sqlite_sink_stores_missing_columns_as_null() {
    let mut sink = SqliteSink::from_connection(Connection::open_in_memory().unwrap());

    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();

    let conn = sink.connection();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM crash_nj_drivers", [], |row| row.get(0))
        .unwrap();
    let nulls: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM crash_nj_drivers WHERE licence IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 3);
    assert_eq!(nulls, 1);
}

#[test]
fn test_sqlite_sink_replaces_on_republish() {
    let mut sink = SqliteSink::from_connection(Connection::open_in_memory().unwrap());
    let dataset = drivers_dataset();

    sink.publish("crash_nj_drivers", &dataset).unwrap();
    sink.publish("crash_nj_drivers", &dataset).unwrap();

    let rows: i64 = sink
        .connection()
        .query_row("SELECT COUNT(*) FROM crash_nj_drivers", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 3);
}

fn row_count(sink: &SqliteSink, table: &str) -> i64 {
    sink.connection()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

fn table_exists(sink: &SqliteSink, table: &str) -> bool {
    sink.connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
        == 1
}

#[test]
fn test_sqlite_sink_empty_table_replaces_previous_rows() {
    let mut sink = SqliteSink::from_connection(Connection::open_in_memory().unwrap());

    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &empty_drivers_dataset()).unwrap();

    assert!(table_exists(&sink, "crash_nj_drivers"));
    assert_eq!(row_count(&sink, "crash_nj_drivers"), 0);
}

#[test]
fn test_sqlite_sink_drops_table_without_columns() {
    let mut sink = SqliteSink::from_connection(Connection::open_in_memory().unwrap());

    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &TableDataset::new("Drivers")).unwrap();

    assert!(!table_exists(&sink, "crash_nj_drivers"));
}

#[test]
fn test_sqlite_sink_rollback_keeps_previous_tables() {
    let mut sink = SqliteSink::from_connection(Connection::open_in_memory().unwrap());
    sink.publish("crash_newjersey", &drivers_dataset()).unwrap();

    sink.begin().unwrap();
    sink.publish("crash_newjersey", &empty_drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    sink.rollback().unwrap();

    assert_eq!(row_count(&sink, "crash_newjersey"), 3);
    assert!(!table_exists(&sink, "crash_nj_drivers"));
}

#[test]
fn test_sqlite_sink_commit_publishes_group() {
    let mut sink = SqliteSink::from_connection(Connection::open_in_memory().unwrap());

    sink.begin().unwrap();
    sink.publish("crash_newjersey", &drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &empty_drivers_dataset()).unwrap();
    sink.commit().unwrap();

    assert!(sink.connection().is_autocommit());
    assert_eq!(row_count(&sink, "crash_newjersey"), 3);
    assert_eq!(row_count(&sink, "crash_nj_drivers"), 0);
}

#[test]
fn test_parquet_sink_empty_table_keeps_columns() {
    let dir = TempDir::new().unwrap();
    let mut sink = ParquetSink::new(dir.path());

    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &empty_drivers_dataset()).unwrap();

    let df = ParquetReader::new(File::open(sink.path_for("crash_nj_drivers")).unwrap())
        .finish()
        .unwrap();
    assert_eq!(df.height(), 0);
    assert_eq!(df.width(), 2);
}

#[test]
fn test_parquet_sink_removes_file_for_table_without_columns() {
    let dir = TempDir::new().unwrap();
    let mut sink = ParquetSink::new(dir.path());

    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &TableDataset::new("Drivers")).unwrap();

    assert!(!sink.path_for("crash_nj_drivers").exists());
}

#[test]
fn test_parquet_sink_rollback_leaves_previous_files() {
    let dir = TempDir::new().unwrap();
    let mut sink = ParquetSink::new(dir.path());
    sink.publish("crash_newjersey", &drivers_dataset()).unwrap();

    sink.begin().unwrap();
    sink.publish("crash_newjersey", &empty_drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    assert!(!sink.path_for("crash_nj_drivers").exists());
    sink.rollback().unwrap();

    let df = ParquetReader::new(File::open(sink.path_for("crash_newjersey")).unwrap())
        .finish()
        .unwrap();
    assert_eq!(df.height(), 3);
    assert!(!sink.path_for("crash_nj_drivers").exists());
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn test_parquet_sink_commit_renames_staged_files() {
    let dir = TempDir::new().unwrap();
    let mut sink = ParquetSink::new(dir.path());

    sink.begin().unwrap();
    sink.publish("crash_newjersey", &drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    sink.commit().unwrap();

    assert!(sink.path_for("crash_newjersey").exists());
    assert!(sink.path_for("crash_nj_drivers").exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_open_sink_from_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db").join("crashes.sqlite");

    let mut sink = open_sink(&SinkConfig::Sqlite { path: path.clone() }).unwrap();
    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();

    assert!(path.exists());
}

#[test]
fn test_deferred_sink_opens_on_first_publish() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("parquet");
    let mut sink = DeferredSink::new(SinkConfig::Parquet { dir: out.clone() });

    assert!(!sink.is_open());
    assert!(!out.exists());

    sink.publish("crash_newjersey", &drivers_dataset()).unwrap();
    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();

    assert!(sink.is_open());
    assert!(out.join("crash_newjersey.parquet").exists());
    assert!(out.join("crash_nj_drivers.parquet").exists());
}

#[test]
fn test_deferred_sink_begin_opens_and_forwards_group() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("crashes.sqlite");
    let mut sink = DeferredSink::new(SinkConfig::Sqlite { path: path.clone() });

    assert!(sink.rollback().is_ok());
    assert!(!path.exists());

    sink.begin().unwrap();
    assert!(sink.is_open());
    sink.publish("crash_nj_drivers", &drivers_dataset()).unwrap();
    sink.rollback().unwrap();

    let conn = Connection::open(&path).unwrap();
    let tables: i64 = conn
        .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(tables, 0);
}
