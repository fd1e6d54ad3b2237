//! Test utilities for table merging

use std::sync::Arc;

use crate::app::models::{CanonicalSchema, Record, UnitKey};


pub fn unit(year: i32, county: &str) -> UnitKey {
    UnitKey::new(year, county, "Vehicles")
}

/// Build `count` records over `fields`, values numbered per row
pub fn records(fields: &[&str], count: usize) -> Vec<Record> {
    let schema = Arc::new(CanonicalSchema::new("Vehicles", fields).unwrap());
    (0..count)
        .map(|row| {
            let values = fields.iter().map(|field| format!("{field}{row}")).collect();
            Record::try_new(Arc::clone(&schema), values).unwrap()
        })
        .collect()
}
