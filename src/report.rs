//! Difference records, comparison reports and their text/JSON rendering

use crate::error::Result;
use crate::introspect::{ForeignKey, IndexDescriptor};
use crate::value::{format_row, Row};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Display names of the two databases being compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
    pub left: String,
    pub right: String,
}

impl Labels {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// A single difference or notice produced by a comparison stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    MissingTables {
        present_in: String,
        absent_from: String,
        tables: Vec<String>,
    },
    ColumnMismatch {
        table: String,
        left_only: Vec<String>,
        right_only: Vec<String>,
    },
    ForeignKeyMismatch {
        table: String,
        left_only: Vec<ForeignKey>,
        right_only: Vec<ForeignKey>,
    },
    IndexMismatch {
        table: String,
        left_only: Vec<IndexDescriptor>,
        right_only: Vec<IndexDescriptor>,
    },
    PrimaryKeyMismatch {
        table: String,
        left_only: Vec<String>,
        right_only: Vec<String>,
    },
    RowCountMismatch {
        table: String,
        left_name: String,
        left_count: usize,
        right_name: String,
        right_count: usize,
    },
    RowMismatch {
        table: String,
        /// 1-based position in the ordered row sequence
        row: usize,
        left_name: String,
        left: Row,
        right_name: String,
        right: Row,
    },
    LengthMismatch {
        table: String,
        left_name: String,
        left_count: usize,
        right_name: String,
        right_count: usize,
    },
    TableSummary {
        table: String,
        equal: usize,
        unequal: usize,
    },
    NotComparable {
        table: String,
        database: String,
        reason: String,
    },
    IntrospectionSkipped {
        table: String,
        database: String,
        reason: String,
    },
}

fn format_set<T: fmt::Display>(left: &[T], right: &[T]) -> String {
    let items: Vec<String> = left.iter().chain(right).map(|i| i.to_string()).collect();
    format!("{{{}}}", items.join(", "))
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingTables {
                present_in,
                absent_from,
                tables,
            } => write!(
                f,
                "Tables in ({}) but not in ({}): {}",
                present_in,
                absent_from,
                format_set(tables, &[])
            ),
            Finding::ColumnMismatch {
                table,
                left_only,
                right_only,
            } => write!(
                f,
                "Different columns in table {}: {}",
                table,
                format_set(left_only, right_only)
            ),
            Finding::ForeignKeyMismatch {
                table,
                left_only,
                right_only,
            } => write!(
                f,
                "Foreign key differences in table {}: {}",
                table,
                format_set(left_only, right_only)
            ),
            Finding::IndexMismatch {
                table,
                left_only,
                right_only,
            } => write!(
                f,
                "Index differences in table {}: {}",
                table,
                format_set(left_only, right_only)
            ),
            Finding::PrimaryKeyMismatch {
                table,
                left_only,
                right_only,
            } => write!(
                f,
                "Primary key differences in table {}: {}",
                table,
                format_set(left_only, right_only)
            ),
            Finding::RowCountMismatch {
                table,
                left_name,
                left_count,
                right_name,
                right_count,
            } => write!(
                f,
                "Table {} has {} entries in ({}) and {} entries in ({})",
                table, left_count, left_name, right_count, right_name
            ),
            Finding::RowMismatch {
                table,
                row,
                left_name,
                left,
                right_name,
                right,
            } => {
                writeln!(f, "--------Difference in table {} at row {}--------", table, row)?;
                writeln!(f, "({}): {}", left_name, format_row(left))?;
                write!(f, "({}): {}", right_name, format_row(right))
            }
            Finding::LengthMismatch {
                table,
                left_name,
                left_count,
                right_name,
                right_count,
            } => write!(
                f,
                "Table {} has {} entries in ({}) and {} entries in ({}).",
                table, left_count, left_name, right_count, right_name
            ),
            Finding::TableSummary {
                table,
                equal,
                unequal,
            } => write!(
                f,
                "Table {}: {} equal rows, {} unequal rows",
                table, equal, unequal
            ),
            Finding::NotComparable {
                table,
                database,
                reason,
            } => write!(
                f,
                "Table {} in ({}) cannot be compared row by row: {}",
                table, database, reason
            ),
            Finding::IntrospectionSkipped {
                table,
                database,
                reason,
            } => write!(
                f,
                "Table {} in ({}) could not be introspected and was left out: {}",
                table, database, reason
            ),
        }
    }
}

/// Comparison stages, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Schema,
    Constraints,
    Counts,
    Data,
}

impl Stage {
    fn differences_heading(&self) -> &'static str {
        match self {
            Stage::Schema => "Schema differences",
            Stage::Constraints => "Key constraint differences",
            Stage::Counts => "Data count differences",
            Stage::Data => "Data differences",
        }
    }

    fn identical_heading(&self) -> &'static str {
        match self {
            Stage::Schema => "Schemas are identical",
            Stage::Constraints => "Key constraints are identical",
            Stage::Counts => "Data counts are identical",
            Stage::Data => "Data is identical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub findings: Vec<Finding>,
}

impl StageOutcome {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Everything a comparison run found, in the order it was found
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub labels: Labels,
    pub started_at: DateTime<Utc>,
    /// Tables left out because their metadata could not be read
    pub notices: Vec<Finding>,
    pub stages: Vec<StageOutcome>,
    /// Stage whose differences stopped the run early
    pub halted_at: Option<Stage>,
}

impl ComparisonReport {
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            started_at: Utc::now(),
            notices: Vec::new(),
            stages: Vec::new(),
            halted_at: None,
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Findings of a stage, empty when the stage did not run
    pub fn findings(&self, stage: Stage) -> &[Finding] {
        self.stage(stage).map(|s| s.findings.as_slice()).unwrap_or(&[])
    }

    pub fn has_differences(&self) -> bool {
        self.stages.iter().any(|s| !s.is_clean())
    }

    /// True when every stage ran and none reported anything
    pub fn is_identical(&self) -> bool {
        self.halted_at.is_none() && self.stages.len() == 4 && !self.has_differences()
    }
}

/// Pretty printer for comparison reports
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Render a report as the line-oriented text shown on the terminal
    pub fn render_report(report: &ComparisonReport) -> String {
        let mut lines = Vec::new();

        if !report.notices.is_empty() {
            lines.push(banner("Introspection notices"));
            lines.extend(report.notices.iter().map(|n| n.to_string()));
        }

        for outcome in &report.stages {
            if outcome.is_clean() {
                lines.push(banner(outcome.stage.identical_heading()));
            } else {
                lines.push(banner(outcome.stage.differences_heading()));
                lines.extend(outcome.findings.iter().map(|f| f.to_string()));
            }
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    pub fn print_report(report: &ComparisonReport) {
        print!("{}", Self::render_report(report));
    }
}

fn banner(title: &str) -> String {
    format!("=========={}==========", title)
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_report(report: &ComparisonReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
