//! In-memory destination used for dry runs.
//!
//! Records every row the migration would write and hands out sequential ids,
//! so a dry run exercises the exact same cascade as a real one.

use async_trait::async_trait;

use super::migration::DestinationWriter;
use super::pool::DbError;
use super::util::to_diesel_error;
use crate::models::{FolderId, LawsuitId, NewAttachment, NewFolder, NewLawsuit};

/// [`DestinationWriter`] that keeps the written rows in memory.
#[derive(Debug, Default)]
pub struct RecordingDestination {
    pub lawsuits: Vec<(LawsuitId, NewLawsuit)>,
    pub folders: Vec<(FolderId, NewFolder)>,
    pub attachments: Vec<NewAttachment>,
    purged: bool,
    closed: bool,
}

impl RecordingDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `purge` ran.
    pub fn purged(&self) -> bool {
        self.purged
    }

    /// Whether `close` ran.
    pub fn closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), DbError> {
        if self.closed {
            Err(to_diesel_error("destination already closed"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DestinationWriter for RecordingDestination {
    async fn purge(&mut self) -> Result<(), DbError> {
        self.ensure_open()?;
        self.lawsuits.clear();
        self.folders.clear();
        self.attachments.clear();
        self.purged = true;
        Ok(())
    }

    async fn insert_lawsuit(&mut self, lawsuit: &NewLawsuit) -> Result<LawsuitId, DbError> {
        self.ensure_open()?;
        let id = LawsuitId(self.lawsuits.len() as u64 + 1);
        self.lawsuits.push((id, lawsuit.clone()));
        Ok(id)
    }

    async fn insert_folder(&mut self, folder: &NewFolder) -> Result<FolderId, DbError> {
        self.ensure_open()?;
        let id = FolderId(self.folders.len() as u64 + 1);
        self.folders.push((id, folder.clone()));
        Ok(id)
    }

    async fn insert_attachment(&mut self, attachment: &NewAttachment) -> Result<(), DbError> {
        self.ensure_open()?;
        self.attachments.push(attachment.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DbError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, LawsuitMetadata};
    use chrono::NaiveDateTime;

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let mut dest = RecordingDestination::new();
        let now = NaiveDateTime::default();
        let category = Category::new(1, "Case", "case");

        let first = dest
            .insert_lawsuit(&NewLawsuit::from_category(
                &category,
                LawsuitMetadata::default(),
                now,
            ))
            .await
            .unwrap();
        let second = dest
            .insert_lawsuit(&NewLawsuit::from_category(
                &category,
                LawsuitMetadata::default(),
                now,
            ))
            .await
            .unwrap();
        let folder = dest
            .insert_folder(&NewFolder::from_category(second, &category, now))
            .await
            .unwrap();

        assert_eq!(first, LawsuitId(1));
        assert_eq!(second, LawsuitId(2));
        assert_eq!(folder, FolderId(1));
    }

    #[tokio::test]
    async fn test_writes_fail_after_close() {
        let mut dest = RecordingDestination::new();
        dest.close().await.unwrap();

        assert!(dest.closed());
        assert!(dest.purge().await.is_err());
    }
}
