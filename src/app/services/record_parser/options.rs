//! Tokenizer configuration

use crate::constants::{DEFAULT_DELIMITER, DEFAULT_NULL_VALUES};

/// How source lines are split into fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Single-byte field delimiter
    pub delimiter: u8,

    /// Field values standing for "no data in this slot"
    pub null_values: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER as u8)
    }
}

impl ParseOptions {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            null_values: default_null_values(),
        }
    }

    pub fn with_null_values(mut self, null_values: Vec<String>) -> Self {
        self.null_values = null_values;
        self
    }

    /// Whether a field value is the absent sentinel
    pub fn is_null(&self, value: &str) -> bool {
        self.null_values.iter().any(|null| null == value)
    }
}

/// The built-in absent-value tokens as owned strings
pub fn default_null_values() -> Vec<String> {
    DEFAULT_NULL_VALUES.iter().map(|value| value.to_string()).collect()
}
