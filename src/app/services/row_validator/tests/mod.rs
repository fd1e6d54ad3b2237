//! Test utilities for row validation testing

use std::sync::Arc;

use crate::app::models::{CanonicalSchema, RawRow, UnitKey};
use crate::app::services::record_parser::RecordParser;


pub fn abc_schema() -> Arc<CanonicalSchema> {
    Arc::new(CanonicalSchema::new("Accidents", ["A", "b", "C"]).unwrap())
}

pub fn test_unit() -> UnitKey {
    UnitKey::new(2019, "Mercer", "Accidents")
}

/// Parse `content` with default options, asserting it produced no diagnostics
pub fn parse_rows(content: &str) -> Vec<RawRow> {
    let outcome = RecordParser::default().parse(&test_unit(), content.as_bytes());
    assert!(outcome.diagnostics.is_empty());
    outcome.rows
}
