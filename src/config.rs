//! Comparison settings: defaults, environment overrides and validation

use crate::error::{DbDiffError, Result};
use serde::Serialize;
use std::env;

/// Default number of row mismatches printed per table
pub const DEFAULT_MAX_DIFFERENCES: usize = 10;

pub const MAX_DIFFERENCES_ENV: &str = "DBDIFF_MAX_DIFFERENCES";
pub const UNKEYED_TABLES_ENV: &str = "DBDIFF_UNKEYED_TABLES";

/// What to do with tables whose rows cannot be put in a deterministic order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnkeyedTablePolicy {
    /// Report the table as not comparable
    #[default]
    Report,
    /// Log a warning and compare the table as if it had no rows
    Skip,
}

impl UnkeyedTablePolicy {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "report" => Ok(Self::Report),
            "skip" => Ok(Self::Skip),
            _ => Err(format!(
                "Invalid unkeyed table policy: {}. Use 'report' or 'skip'",
                s
            )),
        }
    }
}

/// Settings for one comparison run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareConfig {
    /// Per-table cap on printed row mismatches; all mismatches are still counted
    pub max_differences: usize,
    pub unkeyed_tables: UnkeyedTablePolicy,
    /// Surface tables that were dropped because their metadata could not be read
    pub report_skipped_tables: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            max_differences: DEFAULT_MAX_DIFFERENCES,
            unkeyed_tables: UnkeyedTablePolicy::default(),
            report_skipped_tables: true,
        }
    }
}

impl CompareConfig {
    /// Defaults overlaid with `DBDIFF_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_DIFFERENCES_ENV) {
            config.max_differences = parse_max_differences(&raw)
                .map_err(|e| DbDiffError::config(format!("{}: {}", MAX_DIFFERENCES_ENV, e)))?;
        }

        if let Some(raw) = lookup(UNKEYED_TABLES_ENV) {
            config.unkeyed_tables = UnkeyedTablePolicy::parse(&raw)
                .map_err(|e| DbDiffError::config(format!("{}: {}", UNKEYED_TABLES_ENV, e)))?;
        }

        Ok(config)
    }

    pub fn with_max_differences(mut self, max_differences: usize) -> Self {
        self.max_differences = max_differences;
        self
    }

    pub fn with_unkeyed_tables(mut self, policy: UnkeyedTablePolicy) -> Self {
        self.unkeyed_tables = policy;
        self
    }

    pub fn with_report_skipped_tables(mut self, report: bool) -> Self {
        self.report_skipped_tables = report;
        self
    }
}

/// Parse a mismatch cap; zero is allowed and prints counts only
pub fn parse_max_differences(s: &str) -> std::result::Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("Invalid difference cap: '{}'. Must be a non-negative integer.", s))
}
