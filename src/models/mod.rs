//! Data models for the DocMan migration.

mod category;
mod lawsuit;

pub use category::{Category, CategoryId, Document};
pub use lawsuit::{
    AttachmentOwner, AttachmentRole, FolderId, LawsuitId, LawsuitMetadata, NewAttachment,
    NewFolder, NewLawsuit, RecordStatus, ATTACHMENTS_TABLE, ATTACHMENT_DIRECTORY, ATTACHMENT_DISK,
    ATTACHMENT_ORDER, DEFAULT_ORDER, FOLDERS_TABLE, LAWSUITS_TABLE, LAWSUIT_COMMENT,
};
