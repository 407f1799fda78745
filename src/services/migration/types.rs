//! Migration service types and events.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Events emitted while the migration runs.
#[derive(Debug, Clone)]
pub enum MigrationEvent {
    /// Enabled documents were counted; nothing written yet.
    Started { total_documents: u64 },
    /// Destination tables were cleared.
    Purged,
    /// A lawsuit category is being migrated (`position` is 1-based).
    LawsuitStarted {
        position: usize,
        count: usize,
        title: String,
    },
    /// One document was written as an attachment.
    FileMigrated {
        processed: u64,
        total: u64,
        percent: f64,
        file_name: String,
    },
}

/// Configuration for the migration service.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Base path prepended to each attachment's file name in `src`.
    pub target_file_path: PathBuf,
}

/// Files processed against the enabled-document total counted up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationProgress {
    processed: u64,
    total: u64,
}

impl MigrationProgress {
    pub fn new(total: u64) -> Self {
        Self {
            processed: 0,
            total,
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Count one more processed file.
    pub fn advance(&mut self) {
        self.processed += 1;
        if self.processed == self.total + 1 {
            warn!(
                "Processed more files than the {} enabled documents counted at start",
                self.total
            );
        }
    }

    /// Percentage processed, never above 100.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.processed as f64 / self.total as f64 * 100.0).min(100.0)
    }

    /// Progress line as shown to the operator: `12.50% [Photo.jpg]`.
    pub fn format_line(&self, file_name: &str) -> String {
        format!("{:.2}% [{}]", self.percent(), file_name)
    }
}

/// Result of a completed migration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    /// Enabled documents counted before the purge.
    pub total_documents: u64,
    pub lawsuits: usize,
    pub folders: usize,
    pub attachments: usize,
    /// Metadata fields that could not be extracted.
    pub anomalies: usize,
    pub elapsed: Duration,
}

impl MigrationReport {
    /// Enabled documents that no migrated folder reached.
    pub fn unreached_documents(&self) -> u64 {
        self.total_documents
            .saturating_sub(self.attachments as u64)
    }
}
