//! Application constants for the crash reconciler
//!
//! Default run parameters, file naming conventions and report formats used
//! throughout the reconciliation engine.

// =============================================================================
// Default Run Parameters
// =============================================================================

/// First year covered by the default run
pub const DEFAULT_FIRST_YEAR: i32 = 2017;

/// Last year (inclusive) covered by the default run
pub const DEFAULT_LAST_YEAR: i32 = 2021;

/// Counties enumerated by the default run
pub const DEFAULT_COUNTIES: &[&str] = &["Burlington", "Camden", "Gloucester", "Mercer"];

/// Logical tables published by the state for every county and year
pub const DEFAULT_TABLES: &[&str] = &["Accidents", "Drivers", "Pedestrians", "Occupants", "Vehicles"];

// =============================================================================
// Table Naming
// =============================================================================

/// Logical table that maps to a fixed external name
pub const PRIMARY_TABLE: &str = "Accidents";

/// External name of the primary table
pub const PRIMARY_TABLE_NAME: &str = "crash_newjersey";

/// Prefix for every other external table name
pub const TABLE_PREFIX: &str = "crash_nj_";

// =============================================================================
// Filesystem Layout
// =============================================================================

/// Directory holding extracted source files
pub const DEFAULT_DATA_DIR: &str = "extracted";

/// Directory holding canonical field-name lists, one `<Table>.csv` per table
pub const DEFAULT_FIELDS_DIR: &str = "nj_fields";

/// Extension of field-name list files
pub const FIELDS_FILE_EXTENSION: &str = "csv";

/// Extension of source data files
pub const DATA_FILE_EXTENSION: &str = "txt";

/// Extension of source archives
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Directory receiving Parquet output
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default SQLite database file
pub const DEFAULT_SQLITE_PATH: &str = "crashes.sqlite";

// =============================================================================
// Audit Reports
// =============================================================================

/// Issue-level audit report file name
pub const ISSUE_REPORT_NAME: &str = "nj_import_issue_report.txt";

/// Table-level audit report file name
pub const TABLE_REPORT_NAME: &str = "nj_table_report.txt";

/// Rendering of an absent field in problematic row dumps
pub const ABSENT_FIELD_MARKER: &str = "NA";

// =============================================================================
// Parsing
// =============================================================================

/// Field delimiter of the source files
pub const DEFAULT_DELIMITER: char = ',';

/// Quote character honoured by the tokenizer
pub const QUOTE_CHAR: u8 = b'"';

/// Field values read as absent unless configured otherwise
///
/// The pandas default NA tokens, without the empty string.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "-1.#IND", "1.#QNAN", "1.#IND", "-1.#QNAN", "#N/A N/A", "#N/A", "N/A", "n/a", "NA", "<NA>",
    "#NA", "NULL", "null", "NaN", "-NaN", "nan", "-nan", "None",
];

// =============================================================================
// Logging
// =============================================================================

/// Default log level when none specified
pub const DEFAULT_LOG_LEVEL: &str = "info";
