//! Legacy DocMan source models.
//!
//! A DocMan category plays two roles: at depth 1 it is a lawsuit, at depth 2
//! (a direct child of a lawsuit) it is one of the lawsuit's folders.

use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;

/// Identifier of a row in the DocMan category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A DocMan category as read from the source schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub slug: String,
    /// HTML description. Lawsuit metadata lives in a table inside it.
    pub description: Option<String>,
    pub created_on: Option<NaiveDateTime>,
    /// Zero-padded ancestor orderings joined with `/`. Only set for top-level listings.
    pub order_path: Option<String>,
    /// Title of the category's view level.
    pub access_title: Option<String>,
    /// Name of the user holding the edit lock.
    pub owner_name: Option<String>,
    /// Name of the creating user.
    pub author_name: Option<String>,
    /// Name of the last modifying user.
    pub editor_name: Option<String>,
}

impl Category {
    /// Create a category with only the core columns filled in.
    pub fn new(id: u64, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: CategoryId(id),
            title: title.into(),
            slug: slug.into(),
            description: None,
            created_on: None,
            order_path: None,
            access_title: None,
            owner_name: None,
            author_name: None,
            editor_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_on(mut self, created_on: NaiveDateTime) -> Self {
        self.created_on = Some(created_on);
        self
    }

    /// Who owns and may see the category, e.g. `access Public, created by Ana`.
    /// Empty when the listing carried none of it.
    pub fn provenance(&self) -> String {
        [
            ("access", &self.access_title),
            ("created by", &self.author_name),
            ("modified by", &self.editor_name),
            ("locked by", &self.owner_name),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{label} {v}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// An enabled DocMan document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: u64,
    pub category_id: CategoryId,
    pub title: String,
    pub slug: String,
    /// Location of the file in the legacy storage, relative or absolute.
    pub storage_path: String,
    pub created_on: Option<NaiveDateTime>,
}

impl Document {
    /// Base name of the storage path (`/files/abc/Photo.jpg` -> `Photo.jpg`).
    pub fn file_name(&self) -> String {
        Path::new(&self.storage_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.storage_path.clone())
    }

    /// MIME type guessed from the storage path extension.
    pub fn mime_type(&self) -> Option<String> {
        mime_guess::from_path(&self.storage_path)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(storage_path: &str) -> Document {
        Document {
            id: 1,
            category_id: CategoryId(2),
            title: "Photo.jpg".to_string(),
            slug: "photo-jpg".to_string(),
            storage_path: storage_path.to_string(),
            created_on: None,
        }
    }

    #[test]
    fn test_provenance_lists_known_users() {
        let mut category = Category::new(1, "Case 100", "case-100");
        assert_eq!(category.provenance(), "");

        category.access_title = Some("Public".to_string());
        category.author_name = Some("Ana Souza".to_string());
        category.editor_name = Some(String::new());
        category.owner_name = Some("Admin".to_string());
        assert_eq!(
            category.provenance(),
            "access Public, created by Ana Souza, locked by Admin"
        );
    }

    #[test]
    fn test_file_name_is_basename() {
        assert_eq!(document("/files/abc/Photo.jpg").file_name(), "Photo.jpg");
        assert_eq!(document("abc/report.pdf").file_name(), "report.pdf");
        assert_eq!(document("plain.txt").file_name(), "plain.txt");
    }

    #[test]
    fn test_mime_type_from_extension() {
        assert_eq!(
            document("/files/abc/Photo.jpg").mime_type().as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            document("peticao.pdf").mime_type().as_deref(),
            Some("application/pdf")
        );
        assert_eq!(document("no-extension").mime_type(), None);
    }
}
