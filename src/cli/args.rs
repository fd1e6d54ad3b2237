//! Command-line argument definitions for the crash reconciler
//!
//! This module defines the CLI interface using the clap derive API. Every
//! flag is optional and only overrides the corresponding configuration value
//! when given.

use crate::config::{ReconcileConfig, SinkConfig};
use crate::constants::{DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_DIR, DEFAULT_SQLITE_PATH};
use crate::error::{ReconcileError, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the crash data reconciler
#[derive(Debug, Clone, Parser)]
#[command(
    name = "crash-reconciler",
    version,
    about = "Reconcile and merge New Jersey crash extract files by county, year and table",
    long_about = "Parses the per-county, per-year crash extract files, validates every row \
                  against the canonical field list of its table, merges the years into one \
                  dataset per table and publishes the merged tables only when no data file is \
                  missing and no table lost columns between years. Issue and table reports are \
                  written on every run."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Reconcile all units and publish the merged tables on PASS
    Reconcile(ReconcileArgs),
    /// Reconcile all units and write the reports without publishing
    Validate(RunArgs),
}

/// Options shared by every command that performs a run
#[derive(Debug, Clone, ClapArgs)]
pub struct RunArgs {
    /// Path to a JSON configuration file
    ///
    /// Keys missing from the file keep their defaults. Flags given on the
    /// command line override the file.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Root of the extracted files, laid out as `<county>_<year>_<table>/<county><year><table>.txt`
    #[arg(
        short = 'd',
        long = "data-dir",
        value_name = "PATH",
        help = "Directory of extracted crash files"
    )]
    pub data_dir: Option<PathBuf>,

    /// Read units from `<county>_<year>_<table>.zip` archives instead of extracted files
    #[arg(
        long = "archive-dir",
        value_name = "PATH",
        help = "Directory of downloaded zip archives (replaces --data-dir)"
    )]
    pub archive_dir: Option<PathBuf>,

    /// Directory of `<Table>.csv` canonical field lists
    #[arg(
        short = 'f',
        long = "fields-dir",
        value_name = "PATH",
        help = "Directory of canonical field name lists"
    )]
    pub fields_dir: Option<PathBuf>,

    #[arg(
        short = 'r',
        long = "report-dir",
        value_name = "PATH",
        help = "Directory receiving the issue and table reports"
    )]
    pub report_dir: Option<PathBuf>,

    /// Years to reconcile, either a range (`2017-2021`) or a list (`2017,2019`)
    #[arg(
        short = 'y',
        long = "years",
        value_name = "YEARS",
        help = "Years to reconcile, e.g. 2017-2021 or 2017,2019"
    )]
    pub years: Option<YearList>,

    #[arg(
        long = "counties",
        value_name = "LIST",
        value_delimiter = ',',
        help = "Comma-separated list of counties"
    )]
    pub counties: Option<Vec<String>>,

    #[arg(
        short = 't',
        long = "tables",
        value_name = "LIST",
        value_delimiter = ',',
        help = "Comma-separated list of logical tables"
    )]
    pub tables: Option<Vec<String>>,

    /// Field value treated as absent when counting a row's fields
    ///
    /// May be given more than once; the values given replace the built-in
    /// list (`NA`, `NULL`, `N/A`, `NaN` and friends).
    #[arg(
        long = "null-value",
        value_name = "VALUE",
        help = "Field value treated as absent (repeatable, replaces the defaults)"
    )]
    pub null_values: Vec<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show warnings and errors; hides the progress bar
    #[arg(short = 'q', long = "quiet", help = "Suppress progress and info output")]
    pub quiet: bool,
}

/// Arguments for the reconcile command
#[derive(Debug, Clone, ClapArgs)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[arg(
        short = 's',
        long = "sink",
        value_enum,
        help = "Where merged tables are published"
    )]
    pub sink: Option<SinkKind>,

    /// Parquet output directory, or SQLite database file with `--sink sqlite`
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output directory (parquet) or database file (sqlite)"
    )]
    pub output: Option<PathBuf>,
}

/// Publication targets selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// One Parquet file per table
    Parquet,
    /// One table per logical table in a SQLite database
    Sqlite,
}

/// Wrapper for parsing year ranges and lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearList {
    pub years: Vec<i32>,
}

impl FromStr for YearList {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        let parse_year = |value: &str| {
            value.trim().parse::<i32>().map_err(|_| {
                ReconcileError::configuration(format!("'{}' is not a valid year", value.trim()))
            })
        };

        let years: Vec<i32> = match s.split_once('-') {
            Some((first, last)) => {
                let (first, last) = (parse_year(first)?, parse_year(last)?);
                if first > last {
                    return Err(ReconcileError::configuration(format!(
                        "year range {} starts after it ends",
                        s
                    )));
                }
                (first..=last).collect()
            }
            None => s
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(parse_year)
                .collect::<Result<_>>()?,
        };

        if years.is_empty() {
            return Err(ReconcileError::configuration("Year list cannot be empty"));
        }

        Ok(YearList { years })
    }
}

impl RunArgs {
    /// Get the log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => DEFAULT_LOG_LEVEL,
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Validate the run arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(ReconcileError::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        for (flag, dir) in [
            ("--data-dir", &self.data_dir),
            ("--archive-dir", &self.archive_dir),
            ("--fields-dir", &self.fields_dir),
        ] {
            if let Some(dir) = dir {
                if !dir.is_dir() {
                    return Err(ReconcileError::configuration(format!(
                        "{} is not a directory: {}",
                        flag,
                        dir.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Layer these flags over a configuration
    pub fn apply_to(&self, mut config: ReconcileConfig) -> ReconcileConfig {
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(dir) = &self.archive_dir {
            config = config.with_archive_dir(dir);
        }
        if let Some(dir) = &self.fields_dir {
            config = config.with_fields_dir(dir);
        }
        if let Some(dir) = &self.report_dir {
            config = config.with_report_dir(dir);
        }
        if let Some(years) = &self.years {
            config = config.with_years(years.years.clone());
        }
        if let Some(counties) = &self.counties {
            config = config.with_counties(counties.clone());
        }
        if let Some(tables) = &self.tables {
            config = config.with_tables(tables.clone());
        }
        if !self.null_values.is_empty() {
            config = config.with_null_values(self.null_values.clone());
        }
        config
    }
}

impl ReconcileArgs {
    /// Sink chosen on the command line, if any flag selects one
    ///
    /// `--output` alone keeps the configured sink kind and only moves it.
    pub fn sink_override(&self, configured: &SinkConfig) -> Option<SinkConfig> {
        let kind = match (self.sink, configured) {
            (Some(kind), _) => kind,
            (None, SinkConfig::Parquet { .. }) => SinkKind::Parquet,
            (None, SinkConfig::Sqlite { .. }) => SinkKind::Sqlite,
        };

        if self.sink.is_none() && self.output.is_none() {
            return None;
        }

        Some(match kind {
            SinkKind::Parquet => SinkConfig::Parquet {
                dir: self
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            },
            SinkKind::Sqlite => SinkConfig::Sqlite {
                path: self
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH)),
            },
        })
    }
}
