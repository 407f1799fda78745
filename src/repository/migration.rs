//! Migration source and destination traits.
//!
//! The orchestrator only talks to these two seams, so the legacy DocMan
//! reader and the valor writer can be swapped for in-memory versions in dry
//! runs and tests. Both sides hold a single connection, hence `&mut self`.

use async_trait::async_trait;

use super::DbError;
use crate::models::{
    Category, CategoryId, Document, FolderId, LawsuitId, NewAttachment, NewFolder, NewLawsuit,
};

/// Read-only access to the legacy DocMan schema.
#[async_trait]
pub trait SourceReader: Send {
    /// Count all enabled documents (the progress denominator).
    async fn count_enabled_documents(&mut self) -> Result<u64, DbError>;

    /// List the top-level categories that become lawsuits, in `order_path` order.
    async fn list_top_lawsuit_categories(&mut self) -> Result<Vec<Category>, DbError>;

    /// List the direct children of a category.
    async fn list_child_categories(&mut self, parent: CategoryId)
        -> Result<Vec<Category>, DbError>;

    /// List the enabled documents filed directly in a category.
    async fn list_enabled_documents(
        &mut self,
        category: CategoryId,
    ) -> Result<Vec<Document>, DbError>;

    /// Release the underlying connection.
    async fn close(&mut self) -> Result<(), DbError>;
}

/// Write access to the valor lawsuit schema.
#[async_trait]
pub trait DestinationWriter: Send {
    /// Delete all lawsuits, folders and folder-owned attachments.
    async fn purge(&mut self) -> Result<(), DbError>;

    /// Insert a lawsuit and return its generated id.
    async fn insert_lawsuit(&mut self, lawsuit: &NewLawsuit) -> Result<LawsuitId, DbError>;

    /// Insert a folder and return its generated id.
    async fn insert_folder(&mut self, folder: &NewFolder) -> Result<FolderId, DbError>;

    /// Insert an attachment.
    async fn insert_attachment(&mut self, attachment: &NewAttachment) -> Result<(), DbError>;

    /// Release the underlying connection.
    async fn close(&mut self) -> Result<(), DbError>;
}
