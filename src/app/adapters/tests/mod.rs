//! Test utilities for the adapters

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::app::models::{CanonicalSchema, Record, UnitKey};
use crate::app::services::table_merger::{TableDataset, TableMerger};

mod sink_tests;

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Two Drivers units, the second lacking the `licence` column
pub fn drivers_dataset() -> TableDataset {
    let full = Arc::new(CanonicalSchema::new("Drivers", ["id", "licence"]).unwrap());
    let partial = Arc::new(CanonicalSchema::new("Drivers", ["id"]).unwrap());

    let mut merger = TableMerger::new(&["Drivers"]);
    merger.merge(
        "Drivers",
        &UnitKey::new(2019, "Camden", "Drivers"),
        vec![
            Record::try_new(Arc::clone(&full), vec!["1".into(), "L1".into()]).unwrap(),
            Record::try_new(Arc::clone(&full), vec!["2".into(), "L2".into()]).unwrap(),
        ],
    );
    merger.merge(
        "Drivers",
        &UnitKey::new(2020, "Camden", "Drivers"),
        vec![Record::try_new(partial, vec!["3".into()]).unwrap()],
    );

    merger.dataset("Drivers").unwrap().clone()
}

/// A Drivers table whose field list is known but which received no records
pub fn empty_drivers_dataset() -> TableDataset {
    let mut merger = TableMerger::new(&["Drivers"]);
    merger.declare(&CanonicalSchema::new("Drivers", ["id", "licence"]).unwrap());
    merger.dataset("Drivers").unwrap().clone()
}
