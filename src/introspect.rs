//! Schema and key-constraint introspection

use crate::database::SqlSource;
use crate::error::{DbDiffError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Column metadata as reported by `table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// 1-based position within the primary key, 0 when not part of it
    pub pk_ordinal: i64,
}

impl ColumnDescriptor {
    pub fn is_primary_key(&self) -> bool {
        self.pk_ordinal != 0
    }
}

/// One column mapping of a foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ForeignKey {
    pub seq: i64,
    pub referenced_table: String,
    pub column: String,
    /// `None` when the constraint implicitly references the parent's primary key
    pub referenced_column: Option<String>,
    pub on_update: String,
    pub on_delete: String,
    pub match_clause: String,
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}({}) [seq {}, on update {}, on delete {}, match {}]",
            self.column,
            self.referenced_table,
            self.referenced_column.as_deref().unwrap_or("<primary key>"),
            self.seq,
            self.on_update,
            self.on_delete,
            self.match_clause
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub unique: bool,
    /// `c` for CREATE INDEX, `u` for UNIQUE constraints, `pk` for PRIMARY KEY
    pub origin: String,
    pub partial: bool,
}

impl fmt::Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (origin {}", self.name, self.origin)?;
        if self.unique {
            write!(f, ", unique")?;
        }
        if self.partial {
            write!(f, ", partial")?;
        }
        write!(f, ")")
    }
}

/// Table name to ordered column list, in introspection order
pub type TableSchema = IndexMap<String, Vec<ColumnDescriptor>>;

/// Keys and indexes of a single table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TableConstraints {
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexDescriptor>,
    pub primary_key: BTreeSet<String>,
}

pub type KeyConstraints = IndexMap<String, TableConstraints>;

/// A table left out of a snapshot because its metadata could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// Result of reading column metadata for every table of one database
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    pub tables: TableSchema,
    pub skipped: Vec<SkippedTable>,
}

/// Result of reading keys and indexes for every table of one database
#[derive(Debug, Clone, Default)]
pub struct ConstraintSnapshot {
    pub tables: KeyConstraints,
    pub skipped: Vec<SkippedTable>,
}

/// Read column definitions for all user tables.
///
/// Failing to list tables aborts; a failure on one table is logged and that
/// table is left out of the returned map.
pub fn read_schema<S: SqlSource + ?Sized>(source: &S) -> Result<SchemaSnapshot> {
    let tables = list_tables(source)?;
    let mut snapshot = SchemaSnapshot::default();

    for table in tables {
        match source.table_columns(&table) {
            Ok(columns) => {
                snapshot.tables.insert(table, columns);
            }
            Err(e) => {
                let err = DbDiffError::table_introspection(&table, e.to_string());
                log::warn!("({}) {}", source.name(), err);
                snapshot.skipped.push(SkippedTable {
                    table,
                    reason: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "({}) schema: {} tables, {} skipped",
        source.name(),
        snapshot.tables.len(),
        snapshot.skipped.len()
    );
    Ok(snapshot)
}

/// Read foreign keys, indexes and primary key columns for all user tables
pub fn read_constraints<S: SqlSource + ?Sized>(source: &S) -> Result<ConstraintSnapshot> {
    let tables = list_tables(source)?;
    let mut snapshot = ConstraintSnapshot::default();

    for table in tables {
        match read_table_constraints(source, &table) {
            Ok(constraints) => {
                snapshot.tables.insert(table, constraints);
            }
            Err(e) => {
                log::warn!(
                    "({}) Error retrieving constraints for table {}: {}",
                    source.name(),
                    table,
                    e
                );
                snapshot.skipped.push(SkippedTable {
                    table,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(snapshot)
}

fn read_table_constraints<S: SqlSource + ?Sized>(source: &S, table: &str) -> Result<TableConstraints> {
    let foreign_keys = source.foreign_keys(table)?;
    let indexes = source.indexes(table)?;
    let primary_key = source
        .table_columns(table)?
        .into_iter()
        .filter(ColumnDescriptor::is_primary_key)
        .map(|c| c.name)
        .collect();

    Ok(TableConstraints {
        foreign_keys,
        indexes,
        primary_key,
    })
}

fn list_tables<S: SqlSource + ?Sized>(source: &S) -> Result<Vec<String>> {
    source
        .list_tables()
        .map_err(|e| DbDiffError::introspection(format!("({}) {}", source.name(), e)))
}
