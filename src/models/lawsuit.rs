//! Valor lawsuit destination models.
//!
//! These are the rows written by the migration. Every record is built from a
//! source [`Category`] or [`Document`] plus the identifiers generated for its
//! parent during the same run.

use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;

use super::category::{Category, Document};

/// Destination table for lawsuits.
pub const LAWSUITS_TABLE: &str = "valor_lawsuits";
/// Destination table for lawsuit folders.
pub const FOLDERS_TABLE: &str = "valor_lawsuit_folders";
/// Destination table for polymorphic attachments.
pub const ATTACHMENTS_TABLE: &str = "attachments";

/// Storage disk attachments are registered on.
pub const ATTACHMENT_DISK: &str = "public";
/// Directory on the disk holding folder attachments.
pub const ATTACHMENT_DIRECTORY: &str = "valor-lawsuit-folders";

/// Placeholder `order` for lawsuits and folders.
pub const DEFAULT_ORDER: i32 = 1;
/// Placeholder `order` for attachments.
pub const ATTACHMENT_ORDER: i32 = 0;
/// Placeholder `comment` for lawsuits.
pub const LAWSUIT_COMMENT: i32 = 1;

/// Generated identifier of a `valor_lawsuits` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LawsuitId(pub u64);

/// Generated identifier of a `valor_lawsuit_folders` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(pub u64);

impl fmt::Display for LawsuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication status of a destination row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    #[default]
    Active,
}

impl RecordStatus {
    /// Value stored in the `status` column.
    pub fn as_db(&self) -> i32 {
        match self {
            Self::Active => 1,
        }
    }
}

/// Role of an attachment on its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentRole {
    #[default]
    Application,
}

impl AttachmentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
        }
    }
}

/// Owner of an attachment.
///
/// Stored as the `attachable_type`/`attachable_id` pair; the string tag only
/// exists at the SQL boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentOwner {
    LawsuitFolder(FolderId),
}

impl AttachmentOwner {
    /// Value of the `attachable_type` column.
    pub fn attachable_type(&self) -> &'static str {
        match self {
            Self::LawsuitFolder(_) => FOLDERS_TABLE,
        }
    }

    /// Value of the `attachable_id` column.
    pub fn attachable_id(&self) -> u64 {
        match self {
            Self::LawsuitFolder(id) => id.0,
        }
    }
}

/// Metadata scraped from a lawsuit's HTML description.
///
/// `author` and `process_number` fall back to an empty string when their
/// label is missing, the other four stay `None` (stored as NULL).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LawsuitMetadata {
    pub author: String,
    pub process_number: String,
    pub protocol: Option<String>,
    pub nature: Option<String>,
    pub distribution: Option<String>,
    pub judicial_district: Option<String>,
}

impl LawsuitMetadata {
    /// Metadata for a lawsuit without any description at all.
    pub fn blank() -> Self {
        Self {
            author: String::new(),
            process_number: String::new(),
            protocol: Some(String::new()),
            nature: Some(String::new()),
            distribution: Some(String::new()),
            judicial_district: Some(String::new()),
        }
    }
}

/// A `valor_lawsuits` row to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLawsuit {
    pub order: i32,
    pub title: String,
    pub author: String,
    pub process_number: String,
    pub protocol: Option<String>,
    pub nature: Option<String>,
    pub distribution: Option<String>,
    pub judicial_district: Option<String>,
    pub slug: String,
    pub status: RecordStatus,
    pub comment: i32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl NewLawsuit {
    pub fn from_category(
        category: &Category,
        metadata: LawsuitMetadata,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            order: DEFAULT_ORDER,
            title: category.title.clone(),
            author: metadata.author,
            process_number: metadata.process_number,
            protocol: metadata.protocol,
            nature: metadata.nature,
            distribution: metadata.distribution,
            judicial_district: metadata.judicial_district,
            slug: category.slug.clone(),
            status: RecordStatus::Active,
            comment: LAWSUIT_COMMENT,
            created_at: category.created_on,
            updated_at,
        }
    }
}

/// A `valor_lawsuit_folders` row to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFolder {
    pub lawsuit_id: LawsuitId,
    pub order: i32,
    pub title: String,
    pub slug: String,
    pub status: RecordStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl NewFolder {
    pub fn from_category(
        lawsuit_id: LawsuitId,
        category: &Category,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            lawsuit_id,
            order: DEFAULT_ORDER,
            title: category.title.clone(),
            slug: category.slug.clone(),
            status: RecordStatus::Active,
            created_at: category.created_on,
            updated_at,
        }
    }
}

/// An `attachments` row to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    pub owner: AttachmentOwner,
    pub role: AttachmentRole,
    pub order: i32,
    pub title: String,
    pub slug: String,
    pub disk: String,
    pub path: String,
    pub name: String,
    pub src: String,
    pub mime: Option<String>,
    pub status: RecordStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl NewAttachment {
    /// Build the attachment for a document, pointing `src` into `target_file_path`.
    pub fn from_document(
        owner: AttachmentOwner,
        document: &Document,
        target_file_path: &Path,
    ) -> Self {
        let name = document.file_name();
        Self {
            owner,
            role: AttachmentRole::Application,
            order: ATTACHMENT_ORDER,
            title: document.title.clone(),
            slug: document.slug.clone(),
            disk: ATTACHMENT_DISK.to_string(),
            path: ATTACHMENT_DIRECTORY.to_string(),
            src: target_file_path.join(&name).display().to_string(),
            mime: document.mime_type(),
            name,
            status: RecordStatus::Active,
            created_at: document.created_on,
            updated_at: document.created_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryId;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_attachment_owner_maps_to_folder_table() {
        let owner = AttachmentOwner::LawsuitFolder(FolderId(42));
        assert_eq!(owner.attachable_type(), "valor_lawsuit_folders");
        assert_eq!(owner.attachable_id(), 42);
    }

    #[test]
    fn test_attachment_from_document() {
        let document = Document {
            id: 7,
            category_id: CategoryId(3),
            title: "Photo.jpg".to_string(),
            slug: "photo-jpg".to_string(),
            storage_path: "/files/abc/Photo.jpg".to_string(),
            created_on: Some(timestamp()),
        };

        let attachment = NewAttachment::from_document(
            AttachmentOwner::LawsuitFolder(FolderId(9)),
            &document,
            Path::new("/srv/storage/valor-lawsuit-folders"),
        );

        assert_eq!(attachment.name, "Photo.jpg");
        assert_eq!(
            attachment.src,
            "/srv/storage/valor-lawsuit-folders/Photo.jpg"
        );
        assert_eq!(attachment.mime.as_deref(), Some("image/jpeg"));
        assert_eq!(attachment.role.as_str(), "application");
        assert_eq!(attachment.order, 0);
        assert_eq!(attachment.disk, "public");
        assert_eq!(attachment.path, "valor-lawsuit-folders");
        assert_eq!(attachment.created_at, Some(timestamp()));
        assert_eq!(attachment.updated_at, Some(timestamp()));
    }

    #[test]
    fn test_lawsuit_from_category_uses_placeholders() {
        let category = Category::new(1, "Case 100", "case-100").with_created_on(timestamp());
        let metadata = LawsuitMetadata {
            author: "John Doe".to_string(),
            ..Default::default()
        };

        let lawsuit = NewLawsuit::from_category(&category, metadata, timestamp());

        assert_eq!(lawsuit.title, "Case 100");
        assert_eq!(lawsuit.slug, "case-100");
        assert_eq!(lawsuit.author, "John Doe");
        assert_eq!(lawsuit.protocol, None);
        assert_eq!(lawsuit.order, 1);
        assert_eq!(lawsuit.comment, 1);
        assert_eq!(lawsuit.status.as_db(), 1);
        assert_eq!(lawsuit.created_at, Some(timestamp()));
    }

    #[test]
    fn test_blank_metadata_is_all_empty() {
        let blank = LawsuitMetadata::blank();
        assert_eq!(blank.author, "");
        assert_eq!(blank.protocol.as_deref(), Some(""));
        assert_eq!(blank.judicial_district.as_deref(), Some(""));
    }
}
