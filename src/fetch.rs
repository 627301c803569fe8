//! Deterministically ordered row retrieval

use crate::database::SqlSource;
use crate::error::{DbDiffError, Result};
use crate::introspect::{ColumnDescriptor, ForeignKey};
use crate::value::Row;
use serde::Serialize;
use std::fmt;

/// Column used to order a table's rows before position-wise comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SortKey {
    ForeignKey(String),
    PrimaryKey(String),
}

impl SortKey {
    pub fn column(&self) -> &str {
        match self {
            SortKey::ForeignKey(column) | SortKey::PrimaryKey(column) => column,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::ForeignKey(column) => write!(f, "foreign key column {}", column),
            SortKey::PrimaryKey(column) => write!(f, "primary key column {}", column),
        }
    }
}

/// Pick the ordering column for a table.
///
/// The first foreign key wins, then a single-column primary key. Tables
/// with only a composite primary key, or no key at all, have no sortable key.
pub fn resolve_sort_key(
    table: &str,
    foreign_keys: &[ForeignKey],
    columns: &[ColumnDescriptor],
) -> Result<SortKey> {
    if let Some(fk) = foreign_keys.first() {
        return Ok(SortKey::ForeignKey(fk.column.clone()));
    }

    let mut pk_columns = columns.iter().filter(|c| c.is_primary_key());
    match (pk_columns.next(), pk_columns.next()) {
        (Some(column), None) => Ok(SortKey::PrimaryKey(column.name.clone())),
        _ => Err(DbDiffError::no_sortable_key(table)),
    }
}

/// Rows of one table, or why they could not be compared position by position
#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    Rows(Vec<Row>),
    NotComparable(String),
}

impl TableData {
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            TableData::Rows(rows) => Some(rows.as_slice()),
            TableData::NotComparable(_) => None,
        }
    }
}

/// Fetch every row of `table`, ordered by its sortable key
pub fn fetch_rows<S: SqlSource + ?Sized>(source: &S, table: &str) -> Result<Vec<Row>> {
    let foreign_keys = source.foreign_keys(table)?;
    let columns = source.table_columns(table)?;
    let key = resolve_sort_key(table, &foreign_keys, &columns)?;

    log::debug!("({}) ordering {} by {}", source.name(), table, key);
    source.fetch_ordered(table, key.column())
}

/// Fetch a table for comparison; any failure leaves the table `NotComparable`
pub fn fetch_table_data<S: SqlSource + ?Sized>(source: &S, table: &str) -> TableData {
    match fetch_rows(source, table) {
        Ok(rows) => TableData::Rows(rows),
        Err(e) => {
            log::warn!("({}) Error retrieving data from table {}: {}", source.name(), table, e);
            TableData::NotComparable(e.to_string())
        }
    }
}
