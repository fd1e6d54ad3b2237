//! Line formats of the audit reports

use crate::app::models::{ColumnDiscrepancy, Diagnostic, UnitKey, render_values};

pub const MISSING_FILES_HEADER: &str = "Missing files:";
pub const DISCREPANCIES_HEADER: &str = "Discrepancies in columns:";

/// Header opening a block of problematic rows for one file
pub fn problematic_rows_header(unit: &UnitKey) -> String {
    format!("Problematic rows in file {}:", unit.file_id())
}

/// Single issue line for a diagnostic
///
/// Problematic rows render as their `Row <n>: <values>` line only; the block
/// header is the reporter's concern.
pub fn issue_line(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::BadLine { unit, raw, .. } => {
            format!("Bad line in file {}: {}", unit.file_id(), raw)
        }
        Diagnostic::ProblematicRow {
            row_number, values, ..
        } => format!("Row {}: {:?}", row_number, render_values(values)),
        Diagnostic::ParserError { unit, message } => {
            format!("ParserError for file {}: {}", unit.file_id(), message)
        }
        Diagnostic::MissingSchemaFile { table } => {
            format!("Field names file for table '{}' not found.", table)
        }
        Diagnostic::MissingDataFile { unit } => format!(
            "Data file for {} in {} for table {} not found.",
            unit.county, unit.year, unit.table
        ),
    }
}

/// Full text of the table report
pub fn table_report(missing_files: &[String], discrepancies: &[ColumnDiscrepancy]) -> String {
    let mut report = String::new();

    if !missing_files.is_empty() {
        report.push_str(MISSING_FILES_HEADER);
        report.push('\n');
        for file in missing_files {
            report.push_str(file);
            report.push('\n');
        }
    }

    if !discrepancies.is_empty() {
        report.push('\n');
        report.push_str(DISCREPANCIES_HEADER);
        report.push('\n');
        for (table, issues) in group_by_table(discrepancies) {
            report.push_str(&format!("Table: {}\n", table));
            for issue in issues {
                report.push_str(&format!("File: {}\n", issue.file));
                report.push_str(&format!("Missing columns: {}\n", issue.joined_columns()));
            }
        }
    }

    report
}

/// Group discrepancies by table, tables in order of first appearance
fn group_by_table(discrepancies: &[ColumnDiscrepancy]) -> Vec<(&str, Vec<&ColumnDiscrepancy>)> {
    let mut groups: Vec<(&str, Vec<&ColumnDiscrepancy>)> = Vec::new();
    for discrepancy in discrepancies {
        match groups
            .iter_mut()
            .find(|(table, _)| *table == discrepancy.table)
        {
            Some((_, issues)) => issues.push(discrepancy),
            None => groups.push((discrepancy.table.as_str(), vec![discrepancy])),
        }
    }
    groups
}
