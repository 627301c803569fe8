//! Schema and key-constraint comparison

use crate::introspect::{KeyConstraints, TableSchema};
use crate::report::{Finding, Labels};
use std::collections::BTreeSet;

/// Both sides of a set comparison: items only on the left, items only on the right
fn split_difference<T: Ord + Clone>(left: &BTreeSet<T>, right: &BTreeSet<T>) -> (Vec<T>, Vec<T>) {
    (
        left.difference(right).cloned().collect(),
        right.difference(left).cloned().collect(),
    )
}

/// Tables present on both sides, sorted by name
pub fn common_tables<'a>(
    left: impl IntoIterator<Item = &'a String>,
    right: impl IntoIterator<Item = &'a String>,
) -> Vec<String> {
    let left: BTreeSet<&String> = left.into_iter().collect();
    let right: BTreeSet<&String> = right.into_iter().collect();
    left.intersection(&right).map(|t| t.to_string()).collect()
}

/// Compare table sets and, for shared tables, column name sets
pub fn compare_schemas(labels: &Labels, schema1: &TableSchema, schema2: &TableSchema) -> Vec<Finding> {
    let mut differences = Vec::new();
    let tables1: BTreeSet<&String> = schema1.keys().collect();
    let tables2: BTreeSet<&String> = schema2.keys().collect();

    let missing_in_db2: Vec<String> = tables1.difference(&tables2).map(|t| t.to_string()).collect();
    let missing_in_db1: Vec<String> = tables2.difference(&tables1).map(|t| t.to_string()).collect();

    if !missing_in_db2.is_empty() {
        differences.push(Finding::MissingTables {
            present_in: labels.left.clone(),
            absent_from: labels.right.clone(),
            tables: missing_in_db2,
        });
    }
    if !missing_in_db1.is_empty() {
        differences.push(Finding::MissingTables {
            present_in: labels.right.clone(),
            absent_from: labels.left.clone(),
            tables: missing_in_db1,
        });
    }

    for table in tables1.intersection(&tables2) {
        let columns1: BTreeSet<String> = schema1[*table].iter().map(|c| c.name.clone()).collect();
        let columns2: BTreeSet<String> = schema2[*table].iter().map(|c| c.name.clone()).collect();
        if columns1 != columns2 {
            let (left_only, right_only) = split_difference(&columns1, &columns2);
            differences.push(Finding::ColumnMismatch {
                table: table.to_string(),
                left_only,
                right_only,
            });
        }
    }

    differences
}

/// Compare foreign keys, indexes and primary keys of tables present on both sides
pub fn compare_key_constraints(constraints1: &KeyConstraints, constraints2: &KeyConstraints) -> Vec<Finding> {
    let mut differences = Vec::new();
    let tables1: BTreeSet<&String> = constraints1.keys().collect();
    let tables2: BTreeSet<&String> = constraints2.keys().collect();

    for table in tables1.intersection(&tables2) {
        let c1 = &constraints1[*table];
        let c2 = &constraints2[*table];

        let fk1: BTreeSet<_> = c1.foreign_keys.iter().cloned().collect();
        let fk2: BTreeSet<_> = c2.foreign_keys.iter().cloned().collect();
        if fk1 != fk2 {
            let (left_only, right_only) = split_difference(&fk1, &fk2);
            differences.push(Finding::ForeignKeyMismatch {
                table: table.to_string(),
                left_only,
                right_only,
            });
        }

        let idx1: BTreeSet<_> = c1.indexes.iter().cloned().collect();
        let idx2: BTreeSet<_> = c2.indexes.iter().cloned().collect();
        if idx1 != idx2 {
            let (left_only, right_only) = split_difference(&idx1, &idx2);
            differences.push(Finding::IndexMismatch {
                table: table.to_string(),
                left_only,
                right_only,
            });
        }

        if c1.primary_key != c2.primary_key {
            let (left_only, right_only) = split_difference(&c1.primary_key, &c2.primary_key);
            differences.push(Finding::PrimaryKeyMismatch {
                table: table.to_string(),
                left_only,
                right_only,
            });
        }
    }

    differences
}
