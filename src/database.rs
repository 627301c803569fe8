//! SQLite connection handling and the query surface used by the comparison engine

use crate::error::{DbDiffError, Result};
use crate::introspect::{ColumnDescriptor, ForeignKey, IndexDescriptor};
use crate::value::{Row, Value};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// File extension accepted for snapshot files (compared case-insensitively)
pub const DB_EXTENSION: &str = "db3";

/// The queries the comparison engine needs from a database
pub trait SqlSource {
    /// Display name used in findings (the file name for on-disk databases)
    fn name(&self) -> &str;

    /// List user tables, excluding SQLite's internal catalog tables
    fn list_tables(&self) -> Result<Vec<String>>;

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>>;

    fn indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>>;

    /// Fetch every row of `table` ordered ascending by `column`
    fn fetch_ordered(&self, table: &str, column: &str) -> Result<Vec<Row>>;
}

/// A read-only connection to one snapshot file
pub struct Database {
    connection: Connection,
    path: PathBuf,
    name: String,
}

impl Database {
    /// Open a database file read-only and make sure it can actually be read
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(path, flags).map_err(|source| {
            DbDiffError::Connection {
                path: path.to_path_buf(),
                source,
            }
        })?;

        // Opening is lazy; touch the catalog so unreadable files fail here
        connection
            .query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|source| DbDiffError::Connection {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("Opened database {} as ({})", path.display(), name);

        Ok(Self {
            connection,
            path: path.to_path_buf(),
            name,
        })
    }

    /// Open both snapshot files; if the second fails the first is closed before returning
    pub fn open_pair(first: &Path, second: &Path) -> Result<(Self, Self)> {
        let db1 = Self::open(first)?;
        let db2 = Self::open(second)?;
        Ok((db1, db2))
    }

    /// Wrap an existing connection, mostly useful for in-memory databases
    pub fn from_connection(connection: Connection, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            connection,
            path: PathBuf::from(&name),
            name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SqlSource for Database {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             ORDER BY name",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut stmt = self.connection.prepare(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnDescriptor {
                    name: row.get(0)?,
                    declared_type: row.get(1)?,
                    not_null: row.get::<_, i64>(2)? != 0,
                    default_value: row.get(3)?,
                    pk_ordinal: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let mut stmt = self.connection.prepare(
            "SELECT seq, \"table\", \"from\", \"to\", on_update, on_delete, \"match\" \
             FROM pragma_foreign_key_list(?1)",
        )?;
        let keys = stmt
            .query_map([table], |row| {
                Ok(ForeignKey {
                    seq: row.get(0)?,
                    referenced_table: row.get(1)?,
                    column: row.get(2)?,
                    referenced_column: row.get(3)?,
                    on_update: row.get(4)?,
                    on_delete: row.get(5)?,
                    match_clause: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>> {
        let mut stmt = self.connection.prepare(
            "SELECT name, \"unique\", origin, partial FROM pragma_index_list(?1) ORDER BY seq",
        )?;
        let indexes = stmt
            .query_map([table], |row| {
                Ok(IndexDescriptor {
                    name: row.get(0)?,
                    unique: row.get::<_, i64>(1)? != 0,
                    origin: row.get(2)?,
                    partial: row.get::<_, i64>(3)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(indexes)
    }

    fn fetch_ordered(&self, table: &str, column: &str) -> Result<Vec<Row>> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY {}",
            quote_identifier(table),
            quote_identifier(column)
        );
        log::debug!("({}) {}", self.name, sql);

        let mut stmt = self.connection.prepare(&sql)?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(Value::from(row.get_ref(i)?));
                }
                Ok(values)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Quote an SQL identifier, doubling any embedded double quotes
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Check if a path carries the snapshot extension.
///
/// Whatever follows the last dot of the file name counts, so dot-files such
/// as `.db3` are accepted too.
pub fn is_db3_file(file_path: &Path) -> bool {
    file_path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map_or(false, |(_, extension)| extension.eq_ignore_ascii_case(DB_EXTENSION))
}
