//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the row fetching stage.
///
/// Draws on stderr so it never mixes with the comparison report.
#[derive(Debug)]
pub struct ProgressReporter {
    pub fetch_pb: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create progress reporter that tracks fetching `total_tables` tables
    pub fn new_for_fetch(total_tables: u64) -> Self {
        Self {
            fetch_pb: Some(create_progress_bar(total_tables, "Fetching rows...")),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self { fetch_pb: None }
    }

    /// Show which table is currently being read
    pub fn start_table(&self, database: &str, table: &str) {
        if let Some(pb) = &self.fetch_pb {
            pb.set_message(format!("({}) {}", database, table));
        }
    }

    /// Mark one table as fetched from both databases
    pub fn finish_table(&self) {
        if let Some(pb) = &self.fetch_pb {
            pb.inc(1);
        }
    }

    /// Finish fetching and remove the bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.fetch_pb.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} tables {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
