use clap::Parser;
use crash_reconciler::cli::{args::Args, commands};
use std::process;

/// Exit status of a run that completed with a FAIL verdict
const EXIT_VERDICT_FAIL: i32 = 2;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(outcome) if outcome.is_pass() => process::exit(0),
        Ok(_) => process::exit(EXIT_VERDICT_FAIL),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Crash Reconciler - New Jersey crash data reconciliation");
    println!("=======================================================");
    println!();
    println!("Validate per-county, per-year crash extract files against the canonical");
    println!("field lists, merge them per table and publish only reconciled data.");
    println!();
    println!("USAGE:");
    println!("    crash-reconciler <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    reconcile   Reconcile all units and publish merged tables on PASS");
    println!("    validate    Reconcile all units and write reports without publishing");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Reconcile the default years, counties and tables:");
    println!("    crash-reconciler reconcile");
    println!();
    println!("    # Check two years straight from the downloaded archives:");
    println!("    crash-reconciler validate --archive-dir downloads --years 2019-2020");
    println!();
    println!("    # Publish into SQLite instead of Parquet:");
    println!("    crash-reconciler reconcile --sink sqlite --output crashes.sqlite");
    println!();
    println!("EXIT STATUS:");
    println!("    0 PASS, 2 FAIL verdict (see the table report), 1 error");
}
