//! Command implementations for the crash reconciler CLI
//!
//! This module wires configuration, adapters and the run orchestrator
//! together, sets up logging and progress reporting, and prints the run
//! summary.

use crate::app::adapters::{
    ArchiveProvider, DeferredSink, DirectoryProvider, FieldListDirectory, FileProvider,
    MemorySink, TableSink,
};
use crate::app::models::{FailureReason, RunOutcome};
use crate::app::services::reconciliation_reporter::ReconciliationReporter;
use crate::app::services::run_orchestrator::RunOrchestrator;
use crate::cli::args::{Args, Commands, ReconcileArgs, RunArgs};
use crate::config::ReconcileConfig;
use anyhow::{Context, Result, anyhow};
use colored::*;
use indicatif::{HumanDuration, ProgressBar};
use tracing::{debug, info};

/// Main command runner
///
/// Dispatches to the subcommand handler and returns the run outcome; the
/// caller turns the verdict into an exit status.
pub fn run(args: Args) -> Result<RunOutcome> {
    match args.command {
        Some(Commands::Reconcile(reconcile_args)) => run_reconcile(reconcile_args),
        Some(Commands::Validate(run_args)) => run_validate(run_args),
        None => Err(anyhow!("no command given")),
    }
}

/// Reconcile every unit and publish on PASS
fn run_reconcile(args: ReconcileArgs) -> Result<RunOutcome> {
    setup_logging(&args.run)?;
    info!("Starting crash data reconciliation");
    debug!("Command line arguments: {:?}", args);

    let mut config = load_configuration(&args.run)?;
    if let Some(sink) = args.sink_override(&config.sink) {
        config = config.with_sink(sink);
    }
    debug!("Loaded configuration: {:?}", config);

    let mut sink = DeferredSink::new(config.sink.clone());
    let outcome = execute(&config, &args.run, &mut sink, false)?;

    print_summary(&outcome, &config, false);
    Ok(outcome)
}

/// Reconcile every unit and write the reports without publishing
fn run_validate(args: RunArgs) -> Result<RunOutcome> {
    setup_logging(&args)?;
    info!("Starting crash data validation (nothing will be published)");
    debug!("Command line arguments: {:?}", args);

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let mut sink = MemorySink::new();
    let outcome = execute(&config, &args, &mut sink, true)?;

    print_summary(&outcome, &config, true);
    Ok(outcome)
}

fn execute(
    config: &ReconcileConfig,
    args: &RunArgs,
    sink: &mut dyn TableSink,
    dry_run: bool,
) -> Result<RunOutcome> {
    let plan = config.run_plan()?;

    let schemas = FieldListDirectory::new(&config.fields_dir);
    let files: Box<dyn FileProvider> = match &config.archive_dir {
        Some(dir) => {
            info!("Reading units from archives in {}", dir.display());
            Box::new(ArchiveProvider::new(dir))
        }
        None => {
            info!("Reading units from {}", config.data_dir.display());
            Box::new(DirectoryProvider::new(&config.data_dir))
        }
    };

    let mut orchestrator = RunOrchestrator::new(plan);
    if args.show_progress() {
        orchestrator = orchestrator.with_progress(ProgressBar::new(0));
    }
    if dry_run {
        orchestrator = orchestrator.dry_run();
    }

    // Reports are only created once every field list is known to be usable
    orchestrator
        .check_schemas(&schemas)
        .context("Invalid field list")?;
    let reporter =
        ReconciliationReporter::create(&config.issue_report_path(), &config.table_report_path())
            .context("Failed to create audit reports")?;

    orchestrator
        .run_once(&schemas, files.as_ref(), sink, reporter)
        .context("Reconciliation run failed")
}

/// Set up structured logging
pub fn setup_logging(args: &RunArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crash_reconciler={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> args)
pub fn load_configuration(args: &RunArgs) -> Result<ReconcileConfig> {
    args.validate()?;

    let config = match &args.config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            ReconcileConfig::from_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?
        }
        None => ReconcileConfig::default(),
    };

    let config = args.apply_to(config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_summary(outcome: &RunOutcome, config: &ReconcileConfig, dry_run: bool) {
    let stats = &outcome.stats;

    println!("\n{}", "Reconciliation Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        HumanDuration(outcome.elapsed).to_string().bright_white()
    );
    println!(
        "  {} {} of {}",
        "Units processed:".bright_cyan(),
        stats.units_processed.to_string().bright_white(),
        stats.units_total.to_string().bright_white()
    );
    if stats.units_missing > 0 {
        println!(
            "  {} {}",
            "Missing data files:".bright_red(),
            stats.units_missing.to_string().bright_red().bold()
        );
    }
    if stats.units_empty > 0 {
        println!(
            "  {} {}",
            "Empty units:".bright_yellow(),
            stats.units_empty.to_string().bright_yellow()
        );
    }
    println!(
        "  {} {}",
        "Records merged:".bright_cyan(),
        stats.records_merged.to_string().bright_white().bold()
    );
    println!(
        "  {} {} ({} bad lines, {} problematic rows, {} parser errors, {} missing field lists)",
        "Issues recorded:".bright_cyan(),
        stats.total_issues().to_string().bright_white(),
        stats.bad_lines,
        stats.problematic_rows,
        stats.parser_errors,
        stats.missing_schemas
    );
    println!(
        "  {} {}, {}",
        "Reports:".bright_cyan(),
        config.issue_report_path().display(),
        config.table_report_path().display()
    );

    if outcome.is_pass() {
        println!("  {} {}", "Verdict:".bright_cyan(), "PASS".bright_green().bold());
        for table in &outcome.published {
            println!(
                "  {} {} -> {} ({} rows)",
                "Published:".bright_cyan(),
                table.table,
                table.external_name.bright_white(),
                table.rows
            );
        }
        if dry_run {
            println!("  {}", "Dry run: nothing published".bright_yellow());
        }
    } else {
        println!("  {} {}", "Verdict:".bright_cyan(), "FAIL".bright_red().bold());
        for reason in outcome.verdict.reasons() {
            match reason {
                FailureReason::MissingDataFile(file) => {
                    println!("    {} {}", "missing".bright_red(), file);
                }
                FailureReason::ColumnDiscrepancy(discrepancy) => {
                    println!(
                        "    {} {} lacks {}",
                        "discrepancy".bright_red(),
                        discrepancy.file,
                        discrepancy.joined_columns()
                    );
                }
            }
        }
        println!("  {}", "Nothing published".bright_red());
    }
}
