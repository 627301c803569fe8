//! Row count and row content comparison

use crate::config::{CompareConfig, UnkeyedTablePolicy};
use crate::fetch::TableData;
use crate::report::{Finding, Labels};
use crate::structural::common_tables;
use crate::value::Row;
use indexmap::IndexMap;

/// Fetched rows for every table of one database
pub type FetchedTables = IndexMap<String, TableData>;

/// Outcome of comparing one table's ordered rows
#[derive(Debug, Clone, PartialEq)]
pub struct TableComparison {
    pub equal: usize,
    pub unequal: usize,
    pub findings: Vec<Finding>,
}

/// Rows to compare for one side, honouring the unkeyed table policy.
/// `None` means the table must be reported instead of compared.
fn comparable_rows<'a>(data: &'a TableData, policy: UnkeyedTablePolicy) -> Option<&'a [Row]> {
    data.rows().or(match policy {
        UnkeyedTablePolicy::Skip => Some(&[][..]),
        UnkeyedTablePolicy::Report => None,
    })
}

/// Report tables whose row counts differ between the two databases
pub fn compare_data_counts(
    labels: &Labels,
    data1: &FetchedTables,
    data2: &FetchedTables,
    config: &CompareConfig,
) -> Vec<Finding> {
    let mut counts = Vec::new();

    for table in common_tables(data1.keys(), data2.keys()) {
        let left = comparable_rows(&data1[&table], config.unkeyed_tables);
        let right = comparable_rows(&data2[&table], config.unkeyed_tables);
        if let (Some(left), Some(right)) = (left, right) {
            if left.len() != right.len() {
                counts.push(Finding::RowCountMismatch {
                    table: table.clone(),
                    left_name: labels.left.clone(),
                    left_count: left.len(),
                    right_name: labels.right.clone(),
                    right_count: right.len(),
                });
            }
        }
    }

    counts
}

/// Compare row content of every table present on both sides
pub fn compare_data(
    labels: &Labels,
    data1: &FetchedTables,
    data2: &FetchedTables,
    config: &CompareConfig,
) -> Vec<Finding> {
    let mut differences = Vec::new();

    for table in common_tables(data1.keys(), data2.keys()) {
        let sides = [(&labels.left, &data1[&table]), (&labels.right, &data2[&table])];

        for (database, data) in sides {
            if let TableData::NotComparable(reason) = data {
                match config.unkeyed_tables {
                    UnkeyedTablePolicy::Report => differences.push(Finding::NotComparable {
                        table: table.clone(),
                        database: database.clone(),
                        reason: reason.clone(),
                    }),
                    UnkeyedTablePolicy::Skip => {
                        log::warn!("({}) comparing {} as empty: {}", database, table, reason)
                    }
                }
            }
        }

        let left = comparable_rows(sides[0].1, config.unkeyed_tables);
        let right = comparable_rows(sides[1].1, config.unkeyed_tables);
        let (Some(left), Some(right)) = (left, right) else {
            continue;
        };

        if left == right {
            continue;
        }

        let comparison = compare_table_rows(&table, labels, left, right, config.max_differences);
        differences.extend(comparison.findings);
    }

    differences
}

/// Walk two ordered row sequences position by position.
///
/// At most `max_differences` row mismatches are emitted, but every differing
/// position and any length difference is counted as unequal.
pub fn compare_table_rows(
    table: &str,
    labels: &Labels,
    left: &[Row],
    right: &[Row],
    max_differences: usize,
) -> TableComparison {
    let mut findings = Vec::new();
    let mut equal = 0;
    let mut unequal = 0;

    for (i, (l, r)) in left.iter().zip(right).enumerate() {
        if l == r {
            equal += 1;
            continue;
        }

        unequal += 1;
        if unequal <= max_differences {
            findings.push(Finding::RowMismatch {
                table: table.to_string(),
                row: i + 1,
                left_name: labels.left.clone(),
                left: l.clone(),
                right_name: labels.right.clone(),
                right: r.clone(),
            });
        }
    }

    if left.len() != right.len() {
        unequal += left.len().abs_diff(right.len());
        findings.push(Finding::LengthMismatch {
            table: table.to_string(),
            left_name: labels.left.clone(),
            left_count: left.len(),
            right_name: labels.right.clone(),
            right_count: right.len(),
        });
    }

    findings.push(Finding::TableSummary {
        table: table.to_string(),
        equal,
        unequal,
    });

    TableComparison {
        equal,
        unequal,
        findings,
    }
}
