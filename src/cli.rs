//! Command-line interface for dbdiff

use crate::config::{parse_max_differences, UnkeyedTablePolicy};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dbdiff")]
#[command(about = "Compare two SQLite database files")]
#[command(version)]
pub struct Cli {
    /// Path to the first database file
    pub db1: PathBuf,

    /// Path to the second database file
    pub db2: PathBuf,

    /// Maximum number of row differences printed per table (default 10)
    #[arg(long, value_parser = parse_max_differences)]
    pub max_differences: Option<usize>,

    /// Tables without a sortable key: "report" them or "skip" them as empty
    #[arg(long, value_parser = UnkeyedTablePolicy::parse)]
    pub unkeyed_tables: Option<UnkeyedTablePolicy>,

    /// Do not list tables whose metadata could not be read
    #[arg(long)]
    pub hide_skipped_tables: bool,

    /// Output format: "pretty", "json"
    #[arg(long, default_value = "pretty")]
    pub format: String,

    /// Disable the progress bar while fetching rows
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}
