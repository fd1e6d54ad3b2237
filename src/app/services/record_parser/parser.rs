//! File-level parsing loop

use std::io::BufRead;
use tracing::{debug, warn};

use super::options::ParseOptions;
use super::tokenizer::{LineToken, tokenize_line};
use crate::app::models::{Diagnostic, RawRow, UnitKey};

/// Raw rows of one file plus everything that went wrong producing them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub rows: Vec<RawRow>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parser for headerless delimited source files
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    options: ParseOptions,
}

impl RecordParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a whole file
    ///
    /// Untokenizable lines become `BadLine` diagnostics and do not consume a
    /// row number. A read failure part-way through discards every row of the
    /// file and raises a single `ParserError`.
    pub fn parse<R: BufRead>(&self, unit: &UnitKey, reader: R) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        for (index, line) in reader.split(b'\n').enumerate() {
            let line_number = index + 1;
            let mut line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(
                        "Read failed for {} at line {}: {}",
                        unit, line_number, e
                    );
                    outcome.rows.clear();
                    outcome.diagnostics.push(Diagnostic::ParserError {
                        unit: unit.clone(),
                        message: format!("read failed at line {}: {}", line_number, e),
                    });
                    return outcome;
                }
            };
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let fields = match tokenize_line(&line, &self.options) {
                LineToken::Blank => Vec::new(),
                LineToken::Fields(fields) => fields,
                LineToken::Bad { raw, reason } => {
                    debug!("Bad line {} in {}: {}", line_number, unit, reason);
                    outcome.diagnostics.push(Diagnostic::BadLine {
                        unit: unit.clone(),
                        raw,
                        reason,
                    });
                    continue;
                }
            };

            let row_number = outcome.rows.len() + 1;
            outcome
                .rows
                .push(RawRow::new(row_number, line_number, fields));
        }

        debug!(
            "Parsed {} rows from {} ({} diagnostics)",
            outcome.rows.len(),
            unit,
            outcome.diagnostics.len()
        );
        outcome
    }
}
