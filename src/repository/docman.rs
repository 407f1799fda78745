//! Legacy DocMan reader.
//!
//! The SQL here mirrors the queries DocMan itself issues for its category
//! tree, so the lawsuit selection and ordering match what site visitors saw.
//! Column and table names are a fixed external contract; only the Joomla
//! table prefix and the allowed view levels are configurable.

use async_trait::async_trait;
use diesel::sql_types::{BigInt, Unsigned};
use diesel_async::RunQueryDsl;
use tracing::debug;

use super::docman_models::{ChildCategoryRow, CountRow, DocumentRow, LawsuitCategoryRow};
use super::migration::SourceReader;
use super::pool::{DbError, MysqlConn, MysqlPool};
use super::util::to_diesel_error;
use crate::models::{Category, CategoryId, Document};

/// DocMan's column default for dates never set; not a valid DATETIME for diesel.
const ZERO_DATETIME: &str = "0000-00-00 00:00:00";

/// SQL text for the DocMan queries, parameterized by table prefix.
#[derive(Debug, Clone)]
pub struct DocmanQueries {
    prefix: String,
    view_levels: Vec<i32>,
}

impl DocmanQueries {
    /// Create the query set for a Joomla table prefix (e.g. `qxe79_`).
    ///
    /// The prefix is interpolated into SQL and must already be validated.
    pub fn new(prefix: impl Into<String>, view_levels: Vec<i32>) -> Self {
        Self {
            prefix: prefix.into(),
            view_levels,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Count of enabled documents.
    pub fn count_enabled_documents(&self) -> String {
        format!(
            "SELECT COUNT(*) AS `count` FROM `{p}docman_documents` WHERE `enabled` = 1",
            p = self.prefix
        )
    }

    /// Enabled depth-1 categories visible to the allowed view levels,
    /// ordered by their zero-padded ancestor ordering path.
    pub fn top_lawsuit_categories(&self) -> String {
        let view_levels = if self.view_levels.is_empty() {
            // `IN ()` is invalid SQL; no view level matches instead
            "NULL".to_string()
        } else {
            self.view_levels
                .iter()
                .map(|level| level.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "SELECT `tbl`.*, \
             `viewlevel`.`title` AS `access_title`, \
             COUNT(`crumbs`.`ancestor_id`) AS `level`, \
             GROUP_CONCAT(`crumbs`.`ancestor_id` ORDER BY `crumbs`.`level` DESC SEPARATOR '/') AS `path`, \
             `_owner`.`id` AS `_owner_id`, `_owner`.`name` AS `_owner_name`, \
             `_owner`.`username` AS `_owner_username`, `_owner`.`email` AS `_owner_email`, \
             `_owner`.`name` AS `locked_by_name`, \
             `_author`.`id` AS `_author_id`, `_author`.`name` AS `_author_name`, \
             `_author`.`username` AS `_author_username`, `_author`.`email` AS `_author_email`, \
             `_author`.`name` AS `created_by_name`, \
             `_editor`.`id` AS `_editor_id`, `_editor`.`name` AS `_editor_name`, \
             `_editor`.`username` AS `_editor_username`, `_editor`.`email` AS `_editor_email`, \
             `_editor`.`name` AS `modified_by_name`, \
             NULLIF(`tbl`.`created_on`, '{zero}') AS `created_on_date`, \
             `ordering2`.`custom` AS `ordering`, \
             GROUP_CONCAT(LPAD(`ordering`.`custom`, 5, '0') ORDER BY `crumbs`.`level` DESC SEPARATOR '/') AS `order_path` \
             FROM `{p}docman_categories` AS `tbl` \
             LEFT JOIN `{p}viewlevels` AS `viewlevel` ON (`tbl`.`access` = `viewlevel`.`id`) \
             INNER JOIN `{p}docman_category_relations` AS `crumbs` ON (`crumbs`.`descendant_id` = `tbl`.`docman_category_id`) \
             LEFT JOIN `{p}users` AS `_owner` ON (`tbl`.`locked_by` = `_owner`.`id`) \
             LEFT JOIN `{p}users` AS `_author` ON (`tbl`.`created_by` = `_author`.`id`) \
             LEFT JOIN `{p}users` AS `_editor` ON (`tbl`.`modified_by` = `_editor`.`id`) \
             LEFT JOIN `{p}docman_category_orderings` AS `ordering2` ON (`tbl`.`docman_category_id` = `ordering2`.`docman_category_id`) \
             INNER JOIN `{p}docman_category_orderings` AS `ordering` ON (`crumbs`.`ancestor_id` = `ordering`.`docman_category_id`) \
             WHERE `tbl`.`enabled` = 1 AND (`tbl`.`created_by` = 0 OR `tbl`.`access` IN ({levels})) \
             GROUP BY `tbl`.`docman_category_id` \
             HAVING `level` IN (1) \
             ORDER BY `order_path` ASC",
            p = self.prefix,
            levels = view_levels,
            zero = ZERO_DATETIME
        )
    }

    /// Direct children of the category bound as the single parameter.
    pub fn child_categories(&self) -> String {
        format!(
            "SELECT `categories`.`docman_category_id`, `categories`.`title`, \
             `categories`.`slug`, \
             NULLIF(`categories`.`created_on`, '{zero}') AS `created_on` \
             FROM `{p}docman_categories` AS `categories` \
             JOIN `{p}docman_category_relations` AS `relations` \
             ON `relations`.`descendant_id` = `categories`.`docman_category_id` \
             WHERE `relations`.`level` = 1 AND `relations`.`ancestor_id` = ?",
            p = self.prefix,
            zero = ZERO_DATETIME
        )
    }

    /// Enabled documents of the category bound as the single parameter.
    pub fn enabled_documents(&self) -> String {
        format!(
            "SELECT `docman_document_id`, `docman_category_id`, `title`, `slug`, \
             `storage_path`, NULLIF(`created_on`, '{zero}') AS `created_on` \
             FROM `{p}docman_documents` \
             WHERE `docman_category_id` = ? AND `enabled` = 1",
            p = self.prefix,
            zero = ZERO_DATETIME
        )
    }
}

/// [`SourceReader`] backed by a live DocMan MySQL database.
pub struct DocmanSource {
    conn: Option<MysqlConn>,
    queries: DocmanQueries,
}

impl DocmanSource {
    /// Open the source connection.
    pub async fn connect(pool: &MysqlPool, queries: DocmanQueries) -> Result<Self, DbError> {
        let conn = pool.get().await?;
        debug!("Connected to DocMan source (prefix {})", queries.prefix());
        Ok(Self {
            conn: Some(conn),
            queries,
        })
    }

    fn conn(&mut self) -> Result<&mut MysqlConn, DbError> {
        self.conn
            .as_mut()
            .ok_or_else(|| to_diesel_error("source connection already closed"))
    }
}

#[async_trait]
impl SourceReader for DocmanSource {
    async fn count_enabled_documents(&mut self) -> Result<u64, DbError> {
        let query = self.queries.count_enabled_documents();
        let row: CountRow = diesel::sql_query(query).get_result(self.conn()?).await?;
        Ok(row.count.max(0) as u64)
    }

    async fn list_top_lawsuit_categories(&mut self) -> Result<Vec<Category>, DbError> {
        let query = self.queries.top_lawsuit_categories();
        let rows: Vec<LawsuitCategoryRow> = diesel::sql_query(query).load(self.conn()?).await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn list_child_categories(
        &mut self,
        parent: CategoryId,
    ) -> Result<Vec<Category>, DbError> {
        let query = self.queries.child_categories();
        let rows: Vec<ChildCategoryRow> = diesel::sql_query(query)
            .bind::<Unsigned<BigInt>, _>(parent.0)
            .load(self.conn()?)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn list_enabled_documents(
        &mut self,
        category: CategoryId,
    ) -> Result<Vec<Document>, DbError> {
        let query = self.queries.enabled_documents();
        let rows: Vec<DocumentRow> = diesel::sql_query(query)
            .bind::<Unsigned<BigInt>, _>(category.0)
            .load(self.conn()?)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn close(&mut self) -> Result<(), DbError> {
        if self.conn.take().is_some() {
            debug!("Closed DocMan source connection");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries() -> DocmanQueries {
        DocmanQueries::new("qxe79_", vec![1, 5])
    }

    #[test]
    fn test_queries_use_prefix() {
        let q = DocmanQueries::new("jos_", vec![1]);
        assert!(q.count_enabled_documents().contains("`jos_docman_documents`"));
        assert!(q.child_categories().contains("`jos_docman_category_relations`"));
        assert!(q.enabled_documents().contains("`jos_docman_documents`"));
        assert!(!q.top_lawsuit_categories().contains("qxe79_"));
    }

    #[test]
    fn test_top_categories_filters_and_orders() {
        let sql = queries().top_lawsuit_categories();
        assert!(sql.contains("WHERE `tbl`.`enabled` = 1"));
        assert!(sql.contains("`tbl`.`created_by` = 0 OR `tbl`.`access` IN (1, 5)"));
        assert!(sql.contains("HAVING `level` IN (1)"));
        assert!(sql.ends_with("ORDER BY `order_path` ASC"));
        assert!(sql.contains("LPAD(`ordering`.`custom`, 5, '0')"));
    }

    #[test]
    fn test_empty_view_levels_match_nothing() {
        let sql = DocmanQueries::new("qxe79_", Vec::new()).top_lawsuit_categories();
        assert!(sql.contains("`tbl`.`access` IN (NULL)"));
    }

    #[test]
    fn test_zero_dates_are_read_as_null() {
        let q = queries();
        let nullif = "'0000-00-00 00:00:00')";

        let listing = q.top_lawsuit_categories();
        assert!(listing.contains(&format!(
            "NULLIF(`tbl`.`created_on`, {nullif} AS `created_on_date`"
        )));
        assert!(q.child_categories().contains(&format!(
            "NULLIF(`categories`.`created_on`, {nullif} AS `created_on`"
        )));
        assert!(q
            .enabled_documents()
            .contains(&format!("NULLIF(`created_on`, {nullif} AS `created_on`")));
    }

    #[test]
    fn test_child_and_document_queries_are_parameterized() {
        let q = queries();
        assert!(q
            .child_categories()
            .ends_with("`relations`.`level` = 1 AND `relations`.`ancestor_id` = ?"));
        assert!(q
            .enabled_documents()
            .ends_with("`docman_category_id` = ? AND `enabled` = 1"));
    }
}
