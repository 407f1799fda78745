//! DocMan to valor migration service.
//!
//! Walks the DocMan category tree and writes the lawsuit, folder and
//! attachment cascade. Separated from UI concerns - emits events for progress
//! tracking. Every step is awaited before the next one starts.

mod error;
mod types;

use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::models::{AttachmentOwner, Category, LawsuitId, NewAttachment, NewFolder, NewLawsuit};
use crate::repository::{DestinationWriter, SourceReader};
use crate::services::metadata;

pub use error::MigrationError;
pub use types::{MigrationConfig, MigrationEvent, MigrationProgress, MigrationReport};

/// Service moving DocMan lawsuits into the valor schema.
pub struct MigrationService<S, D> {
    source: S,
    destination: D,
    config: MigrationConfig,
}

impl<S: SourceReader, D: DestinationWriter> MigrationService<S, D> {
    /// Create a new migration service over open source and destination handles.
    pub fn new(source: S, destination: D, config: MigrationConfig) -> Self {
        Self {
            source,
            destination,
            config,
        }
    }

    /// Give back the source and destination, e.g. to inspect a dry run.
    pub fn into_parts(self) -> (S, D) {
        (self.source, self.destination)
    }

    /// Run the whole migration.
    ///
    /// Both sides are closed before this returns, whether the run succeeded
    /// or not. The first failure aborts the run; rows already written stay.
    pub async fn migrate(
        &mut self,
        event_tx: mpsc::Sender<MigrationEvent>,
    ) -> Result<MigrationReport, MigrationError> {
        let started = Instant::now();
        let result = self.run(&event_tx).await;
        let closed = self.teardown().await;

        let mut report = result?;
        closed?;
        report.elapsed = started.elapsed();

        info!(
            "Migrated {} lawsuits, {} folders, {} attachments in {:.1}s",
            report.lawsuits,
            report.folders,
            report.attachments,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    async fn run(
        &mut self,
        event_tx: &mpsc::Sender<MigrationEvent>,
    ) -> Result<MigrationReport, MigrationError> {
        let total_documents = self
            .source
            .count_enabled_documents()
            .await
            .map_err(MigrationError::SourceQuery)?;
        info!("{} enabled documents to migrate", total_documents);
        let _ = event_tx
            .send(MigrationEvent::Started { total_documents })
            .await;

        self.destination
            .purge()
            .await
            .map_err(MigrationError::DestinationWrite)?;
        let _ = event_tx.send(MigrationEvent::Purged).await;

        let lawsuits = self
            .source
            .list_top_lawsuit_categories()
            .await
            .map_err(MigrationError::SourceQuery)?;

        let mut progress = MigrationProgress::new(total_documents);
        let mut report = MigrationReport {
            total_documents,
            ..Default::default()
        };

        let count = lawsuits.len();
        for (index, category) in lawsuits.iter().enumerate() {
            let provenance = category.provenance();
            if provenance.is_empty() {
                info!("Lawsuit {}/{}: {}", index + 1, count, category.title);
            } else {
                info!(
                    "Lawsuit {}/{}: {} ({})",
                    index + 1,
                    count,
                    category.title,
                    provenance
                );
            }
            let _ = event_tx
                .send(MigrationEvent::LawsuitStarted {
                    position: index + 1,
                    count,
                    title: category.title.clone(),
                })
                .await;

            self.migrate_lawsuit(category, &mut progress, &mut report, event_tx)
                .await?;
        }

        if progress.processed() < total_documents {
            debug!(
                "{} enabled documents were not under a migrated folder",
                total_documents - progress.processed()
            );
        }

        Ok(report)
    }

    async fn migrate_lawsuit(
        &mut self,
        category: &Category,
        progress: &mut MigrationProgress,
        report: &mut MigrationReport,
        event_tx: &mpsc::Sender<MigrationEvent>,
    ) -> Result<(), MigrationError> {
        let extraction = metadata::extract(category.description.as_deref());
        for anomaly in &extraction.anomalies {
            debug!("Category {} ({}): {}", category.id, category.title, anomaly);
        }
        report.anomalies += extraction.anomalies.len();

        let lawsuit = NewLawsuit::from_category(category, extraction.metadata, now());
        let lawsuit_id = self
            .destination
            .insert_lawsuit(&lawsuit)
            .await
            .map_err(MigrationError::DestinationWrite)?;
        report.lawsuits += 1;

        let folders = self
            .source
            .list_child_categories(category.id)
            .await
            .map_err(MigrationError::SourceQuery)?;

        for folder in &folders {
            self.migrate_folder(lawsuit_id, folder, progress, report, event_tx)
                .await?;
        }

        Ok(())
    }

    async fn migrate_folder(
        &mut self,
        lawsuit_id: LawsuitId,
        category: &Category,
        progress: &mut MigrationProgress,
        report: &mut MigrationReport,
        event_tx: &mpsc::Sender<MigrationEvent>,
    ) -> Result<(), MigrationError> {
        let folder = NewFolder::from_category(lawsuit_id, category, now());
        let folder_id = self
            .destination
            .insert_folder(&folder)
            .await
            .map_err(MigrationError::DestinationWrite)?;
        report.folders += 1;

        let documents = self
            .source
            .list_enabled_documents(category.id)
            .await
            .map_err(MigrationError::SourceQuery)?;

        let owner = AttachmentOwner::LawsuitFolder(folder_id);
        for document in &documents {
            let attachment =
                NewAttachment::from_document(owner, document, &self.config.target_file_path);
            self.destination
                .insert_attachment(&attachment)
                .await
                .map_err(MigrationError::DestinationWrite)?;
            report.attachments += 1;

            progress.advance();
            debug!("{}", progress.format_line(&attachment.name));
            let _ = event_tx
                .send(MigrationEvent::FileMigrated {
                    processed: progress.processed(),
                    total: progress.total(),
                    percent: progress.percent(),
                    file_name: attachment.name,
                })
                .await;
        }

        Ok(())
    }

    /// Close both sides, attempting each even if the other fails.
    async fn teardown(&mut self) -> Result<(), MigrationError> {
        let source = self.source.close().await;
        let destination = self.destination.close().await;

        if let Err(e) = &source {
            warn!("Failed to close source connection: {}", e);
        }
        if let Err(e) = &destination {
            warn!("Failed to close destination connection: {}", e);
        }

        source.map_err(MigrationError::SourceQuery)?;
        destination.map_err(MigrationError::DestinationWrite)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
