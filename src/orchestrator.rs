//! Staged comparison of two databases.
//!
//! Stages run strictly in order: schema, key constraints, row counts, row
//! content. Differences in the schema or constraint stage stop the run, since
//! rows of structurally different tables cannot be lined up. Count
//! differences are reported and the run continues into the content stage.

use crate::config::CompareConfig;
use crate::content::{compare_data, compare_data_counts, FetchedTables};
use crate::database::{Database, SqlSource};
use crate::error::Result;
use crate::fetch::fetch_table_data;
use crate::introspect::{read_constraints, read_schema, SkippedTable};
use crate::progress::ProgressReporter;
use crate::report::{ComparisonReport, Finding, Labels, Stage, StageOutcome};
use crate::structural::{common_tables, compare_key_constraints, compare_schemas};
use std::path::Path;

/// Runs the comparison stages over two open databases
pub struct Comparator<'a> {
    left: &'a dyn SqlSource,
    right: &'a dyn SqlSource,
    config: CompareConfig,
    show_progress: bool,
}

impl<'a> Comparator<'a> {
    pub fn new(left: &'a dyn SqlSource, right: &'a dyn SqlSource, config: CompareConfig) -> Self {
        Self {
            left,
            right,
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run every stage, stopping early on structural differences.
    ///
    /// Errors are returned only for failures that make the whole comparison
    /// impossible, such as being unable to list a database's tables.
    pub fn run(&self) -> Result<ComparisonReport> {
        let labels = Labels::new(self.left.name(), self.right.name());
        let mut report = ComparisonReport::new(labels.clone());

        log::debug!("Comparing schemas of ({}) and ({})", labels.left, labels.right);
        let schema1 = read_schema(self.left)?;
        let schema2 = read_schema(self.right)?;
        self.record_skipped(&mut report, &labels.left, &schema1.skipped);
        self.record_skipped(&mut report, &labels.right, &schema2.skipped);

        let schema_differences = compare_schemas(&labels, &schema1.tables, &schema2.tables);
        if Self::finish_stage(&mut report, Stage::Schema, schema_differences) {
            return Ok(report);
        }

        log::debug!("Comparing key constraints");
        let constraints1 = read_constraints(self.left)?;
        let constraints2 = read_constraints(self.right)?;
        self.record_skipped(&mut report, &labels.left, &constraints1.skipped);
        self.record_skipped(&mut report, &labels.right, &constraints2.skipped);

        let key_differences = compare_key_constraints(&constraints1.tables, &constraints2.tables);
        if Self::finish_stage(&mut report, Stage::Constraints, key_differences) {
            return Ok(report);
        }

        let tables = common_tables(schema1.tables.keys(), schema2.tables.keys());
        log::debug!("Fetching rows of {} common tables", tables.len());
        let (data1, data2) = self.fetch_all(&tables);

        let count_differences = compare_data_counts(&labels, &data1, &data2, &self.config);
        Self::finish_stage(&mut report, Stage::Counts, count_differences);

        log::debug!("Comparing row content");
        let data_differences = compare_data(&labels, &data1, &data2, &self.config);
        Self::finish_stage(&mut report, Stage::Data, data_differences);

        Ok(report)
    }

    /// Record a stage outcome; returns true when the run must stop here
    fn finish_stage(report: &mut ComparisonReport, stage: Stage, findings: Vec<Finding>) -> bool {
        let halts = !findings.is_empty() && matches!(stage, Stage::Schema | Stage::Constraints);
        log::debug!("{:?} stage: {} findings", stage, findings.len());
        report.stages.push(StageOutcome { stage, findings });
        if halts {
            report.halted_at = Some(stage);
        }
        halts
    }

    fn record_skipped(&self, report: &mut ComparisonReport, database: &str, skipped: &[SkippedTable]) {
        if !self.config.report_skipped_tables {
            return;
        }

        for skip in skipped {
            let already_noted = report.notices.iter().any(|n| {
                matches!(n, Finding::IntrospectionSkipped { table, database: db, .. }
                    if table == &skip.table && db == database)
            });
            if !already_noted {
                report.notices.push(Finding::IntrospectionSkipped {
                    table: skip.table.clone(),
                    database: database.to_string(),
                    reason: skip.reason.clone(),
                });
            }
        }
    }

    /// Fetch ordered rows of every table, one table and one database at a time
    fn fetch_all(&self, tables: &[String]) -> (FetchedTables, FetchedTables) {
        let mut progress = if self.show_progress {
            ProgressReporter::new_for_fetch(tables.len() as u64)
        } else {
            ProgressReporter::new_minimal()
        };

        let mut data1 = FetchedTables::new();
        let mut data2 = FetchedTables::new();

        for table in tables {
            progress.start_table(self.left.name(), table);
            data1.insert(table.clone(), fetch_table_data(self.left, table));

            progress.start_table(self.right.name(), table);
            data2.insert(table.clone(), fetch_table_data(self.right, table));

            progress.finish_table();
        }

        progress.finish();
        (data1, data2)
    }
}

/// Open two snapshot files and compare them
pub fn compare_files(
    db1_path: &Path,
    db2_path: &Path,
    config: CompareConfig,
    show_progress: bool,
) -> Result<ComparisonReport> {
    let (db1, db2) = Database::open_pair(db1_path, db2_path)?;
    log::info!(
        "Comparing {} with {}",
        db1.path().display(),
        db2.path().display()
    );

    Comparator::new(&db1, &db2, config)
        .with_progress(show_progress)
        .run()
}
