//! Single-line tokenization
//!
//! Each physical line is tokenized on its own so one broken line can never
//! swallow the lines after it (an unterminated quote would otherwise run to
//! the end of the file).

use csv::{ReaderBuilder, StringRecord};

use super::options::ParseOptions;
use crate::constants::QUOTE_CHAR;

/// Result of tokenizing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    /// Empty line; kept as a row with no fields
    Blank,
    /// Tokenized fields, `None` where the value is a null sentinel
    Fields(Vec<Option<String>>),
    /// The line cannot be tokenized under the delimiter rules
    Bad { raw: String, reason: String },
}

/// Tokenize one line with its terminator already stripped
pub fn tokenize_line(line: &[u8], options: &ParseOptions) -> LineToken {
    if line.is_empty() {
        return LineToken::Blank;
    }

    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => {
            return LineToken::Bad {
                raw: String::from_utf8_lossy(line).into_owned(),
                reason: format!("invalid UTF-8: {}", e),
            };
        }
    };

    if has_unterminated_quote(line, options.delimiter) {
        return LineToken::Bad {
            raw: text.to_string(),
            reason: "unterminated quoted field".to_string(),
        };
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .quote(QUOTE_CHAR)
        .from_reader(line);

    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => LineToken::Fields(
            record
                .iter()
                .map(|field| {
                    if options.is_null(field) {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        ),
        Ok(false) => LineToken::Blank,
        Err(e) => LineToken::Bad {
            raw: text.to_string(),
            reason: e.to_string(),
        },
    }
}

/// Whether a field that opens with a quote runs off the end of the line
///
/// Quotes inside an unquoted field are literal characters, as in `5'10"`.
fn has_unterminated_quote(line: &[u8], delimiter: u8) -> bool {
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut bytes = line.iter().peekable();

    while let Some(&byte) = bytes.next() {
        if in_quotes {
            if byte == QUOTE_CHAR {
                if bytes.peek() == Some(&&QUOTE_CHAR) {
                    bytes.next();
                } else {
                    in_quotes = false;
                }
            }
        } else if byte == delimiter {
            at_field_start = true;
            continue;
        } else if at_field_start && byte == QUOTE_CHAR {
            in_quotes = true;
        }
        at_field_start = false;
    }

    in_quotes
}
