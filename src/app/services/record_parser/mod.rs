//! Record parser for headerless delimited crash files
//!
//! Turns one source file into a sequence of raw rows without aborting on
//! malformed input. Output travels on two channels: the rows themselves and
//! the diagnostics raised while producing them.
//!
//! ## Architecture
//!
//! - [`options`] - Delimiter and null-sentinel configuration
//! - [`tokenizer`] - Single-line tokenization on top of the `csv` crate
//! - [`parser`] - File-level loop, row numbering and error containment
//!
//! ## Usage
//!
//! ```rust
//! use crash_reconciler::app::models::UnitKey;
//! use crash_reconciler::app::services::record_parser::{ParseOptions, RecordParser};
//!
//! let unit = UnitKey::new(2020, "Camden", "Drivers");
//! let parser = RecordParser::new(ParseOptions::default());
//! let outcome = parser.parse(&unit, "1,2,3\n4,5\n".as_bytes());
//!
//! assert_eq!(outcome.rows.len(), 2);
//! assert!(outcome.diagnostics.is_empty());
//! ```

pub mod options;
pub mod parser;
pub mod tokenizer;

#[cfg(test)]
mod tests;

pub use options::{ParseOptions, default_null_values};
pub use parser::{ParseOutcome, RecordParser};
pub use tokenizer::{LineToken, tokenize_line};
