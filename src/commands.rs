//! Command implementation for the dbdiff CLI

use crate::cli::{Cli, OutputFormat};
use crate::config::CompareConfig;
use crate::database::is_db3_file;
use crate::error::{DbDiffError, Result};
use crate::orchestrator::compare_files;
use crate::report::{ComparisonReport, JsonFormatter, PrettyPrinter};
use std::path::Path;

/// Execute a comparison and print its report.
///
/// Returns `Ok` whenever the comparison ran to completion, whether or not
/// differences were found.
pub fn execute_command(cli: &Cli) -> Result<()> {
    let format = OutputFormat::parse(&cli.format).map_err(DbDiffError::config)?;

    let invalid = invalid_inputs(&[cli.db1.as_path(), cli.db2.as_path()]);
    if !invalid.is_empty() {
        for err in &invalid {
            println!("{}", err);
        }
        return Err(DbDiffError::invalid_input(
            "both arguments must be .db3 files, no comparison performed",
        ));
    }

    let report = run_comparison(cli)?;

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_report(&report),
        OutputFormat::Json => println!("{}", JsonFormatter::format_report(&report)?),
    }

    Ok(())
}

/// Build the comparison settings: defaults, then environment, then flags
pub fn resolve_config(cli: &Cli) -> Result<CompareConfig> {
    let mut config = CompareConfig::from_env()?;

    if let Some(max_differences) = cli.max_differences {
        config = config.with_max_differences(max_differences);
    }
    if let Some(policy) = cli.unkeyed_tables {
        config = config.with_unkeyed_tables(policy);
    }
    if cli.hide_skipped_tables {
        config = config.with_report_skipped_tables(false);
    }

    log::debug!("Using configuration: {:?}", config);
    Ok(config)
}

/// Run the comparison described by the command line without printing it
pub fn run_comparison(cli: &Cli) -> Result<ComparisonReport> {
    let config = resolve_config(cli)?;
    compare_files(&cli.db1, &cli.db2, config, !cli.no_progress)
}

/// One error per path that does not carry the `.db3` extension
pub fn invalid_inputs(paths: &[&Path]) -> Vec<DbDiffError> {
    paths
        .iter()
        .filter(|p| !is_db3_file(p))
        .map(|p| DbDiffError::InvalidExtension {
            path: p.to_path_buf(),
        })
        .collect()
}
