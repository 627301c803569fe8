//! # dbdiff
//!
//! Compares two SQLite snapshot files and reports missing tables, column set
//! mismatches, key and index mismatches, row count mismatches and row-level
//! data mismatches.

pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod fetch;
pub mod introspect;
pub mod orchestrator;
pub mod progress;
pub mod report;
pub mod structural;
pub mod value;

pub use config::{CompareConfig, UnkeyedTablePolicy};
pub use database::{Database, SqlSource};
pub use error::{DbDiffError, Result};
pub use orchestrator::{compare_files, Comparator};
pub use report::{ComparisonReport, Finding, Stage};
