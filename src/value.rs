//! Scalar values and rows fetched from SQLite tables

use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;

/// A single cell value, tagged by SQLite storage class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    /// TEXT whose bytes are not valid UTF-8, kept verbatim so it compares exactly
    NonUtf8Text(Vec<u8>),
    Blob(Vec<u8>),
    Null,
}

/// One table row, positionally aligned with the table's column order
pub type Row = Vec<Value>;

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(s) => match std::str::from_utf8(s) {
                Ok(text) => Value::Text(text.to_string()),
                Err(_) => Value::NonUtf8Text(s.to_vec()),
            },
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{:?}", r),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::NonUtf8Text(bytes) => {
                write!(f, "'{}'", String::from_utf8_lossy(bytes).replace('\'', "''"))
            }
            Value::Blob(b) => {
                write!(f, "x'")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
            Value::Null => write!(f, "NULL"),
        }
    }
}

/// Render a row as a parenthesised, comma separated tuple
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
    format!("({})", cells.join(", "))
}
