//! Diesel row types for the legacy DocMan queries.
//!
//! The queries are raw SQL against a fixed external schema, so rows are
//! mapped by column name with `QueryableByName` and converted into the
//! domain models right away.

use chrono::NaiveDateTime;
use diesel::sql_types::{BigInt, Datetime, Nullable, Text, Unsigned};

use crate::models::{Category, CategoryId, Document};

/// Row of the top-level category listing.
#[derive(Debug, diesel::QueryableByName)]
pub struct LawsuitCategoryRow {
    #[diesel(sql_type = Unsigned<BigInt>)]
    pub docman_category_id: u64,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub slug: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    /// `created_on` with DocMan's zero date mapped to NULL. `tbl.*` already
    /// carries the raw column, so this one has its own name.
    #[diesel(sql_type = Nullable<Datetime>, column_name = created_on_date)]
    pub created_on: Option<NaiveDateTime>,
    #[diesel(sql_type = Nullable<Text>)]
    pub order_path: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub access_title: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub locked_by_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub created_by_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub modified_by_name: Option<String>,
}

impl From<LawsuitCategoryRow> for Category {
    fn from(r: LawsuitCategoryRow) -> Self {
        Category {
            id: CategoryId(r.docman_category_id),
            title: r.title,
            slug: r.slug,
            description: r.description,
            created_on: r.created_on,
            order_path: r.order_path,
            access_title: r.access_title,
            owner_name: r.locked_by_name,
            author_name: r.created_by_name,
            editor_name: r.modified_by_name,
        }
    }
}

/// Row of the child category listing.
#[derive(Debug, diesel::QueryableByName)]
pub struct ChildCategoryRow {
    #[diesel(sql_type = Unsigned<BigInt>)]
    pub docman_category_id: u64,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub slug: String,
    #[diesel(sql_type = Nullable<Datetime>)]
    pub created_on: Option<NaiveDateTime>,
}

impl From<ChildCategoryRow> for Category {
    fn from(r: ChildCategoryRow) -> Self {
        Category {
            created_on: r.created_on,
            ..Category::new(r.docman_category_id, r.title, r.slug)
        }
    }
}

/// Row of the document listing.
#[derive(Debug, diesel::QueryableByName)]
pub struct DocumentRow {
    #[diesel(sql_type = Unsigned<BigInt>)]
    pub docman_document_id: u64,
    #[diesel(sql_type = Unsigned<BigInt>)]
    pub docman_category_id: u64,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub slug: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub storage_path: Option<String>,
    #[diesel(sql_type = Nullable<Datetime>)]
    pub created_on: Option<NaiveDateTime>,
}

impl From<DocumentRow> for Document {
    fn from(r: DocumentRow) -> Self {
        Document {
            id: r.docman_document_id,
            category_id: CategoryId(r.docman_category_id),
            title: r.title,
            slug: r.slug,
            storage_path: r.storage_path.unwrap_or_default(),
            created_on: r.created_on,
        }
    }
}

/// Single `COUNT(*)` result.
#[derive(Debug, diesel::QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}
