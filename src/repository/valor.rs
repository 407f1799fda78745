//! Valor lawsuit writer.
//!
//! Inserts go through one MySQL connection; the generated id is read back
//! with `LAST_INSERT_ID()` on that same connection before the next statement.

use async_trait::async_trait;
use diesel::sql_types::{BigInt, Datetime, Integer, Nullable, Text, Unsigned};
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use super::migration::DestinationWriter;
use super::pool::{DbError, MysqlConn, MysqlPool};
use super::util::to_diesel_error;
use crate::models::{
    FolderId, LawsuitId, NewAttachment, NewFolder, NewLawsuit, ATTACHMENTS_TABLE, FOLDERS_TABLE,
    LAWSUITS_TABLE,
};

const INSERT_LAWSUIT: &str = "INSERT INTO valor_lawsuits (`order`, `title`, `author`, \
    `process_number`, `protocol`, `nature`, `distribution`, `judicial_district`, `slug`, \
    `status`, `comment`, `created_at`, `updated_at`) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const INSERT_FOLDER: &str = "INSERT INTO valor_lawsuit_folders (`valor_lawsuit_id`, `order`, \
    `title`, `slug`, `status`, `created_at`, `updated_at`) \
    VALUES (?, ?, ?, ?, ?, ?, ?)";

const INSERT_ATTACHMENT: &str = "INSERT INTO attachments (`attachable_type`, `attachable_id`, \
    `role`, `order`, `title`, `slug`, `disk`, `path`, `name`, `src`, `mime`, `status`, \
    `created_at`, `updated_at`) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

#[derive(diesel::QueryableByName)]
struct LastInsertId {
    #[diesel(sql_type = Unsigned<BigInt>)]
    id: u64,
}

/// [`DestinationWriter`] backed by the valor MySQL database.
pub struct ValorDestination {
    conn: Option<MysqlConn>,
}

impl ValorDestination {
    /// Open the destination connection.
    pub async fn connect(pool: &MysqlPool) -> Result<Self, DbError> {
        let conn = pool.get().await?;
        debug!("Connected to valor destination");
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut MysqlConn, DbError> {
        self.conn
            .as_mut()
            .ok_or_else(|| to_diesel_error("destination connection already closed"))
    }

    async fn last_insert_id(&mut self) -> Result<u64, DbError> {
        let row: LastInsertId = diesel::sql_query("SELECT LAST_INSERT_ID() AS `id`")
            .get_result(self.conn()?)
            .await?;
        Ok(row.id)
    }
}

#[async_trait]
impl DestinationWriter for ValorDestination {
    async fn purge(&mut self) -> Result<(), DbError> {
        let conn = self.conn()?;

        let lawsuits = diesel::sql_query(format!("DELETE FROM {LAWSUITS_TABLE}"))
            .execute(&mut *conn)
            .await?;
        let folders = diesel::sql_query(format!("DELETE FROM {FOLDERS_TABLE}"))
            .execute(&mut *conn)
            .await?;
        let attachments = diesel::sql_query(format!(
            "DELETE FROM {ATTACHMENTS_TABLE} WHERE attachable_type = ?"
        ))
        .bind::<Text, _>(FOLDERS_TABLE)
        .execute(&mut *conn)
        .await?;

        info!(
            "Purged {} lawsuits, {} folders, {} attachments",
            lawsuits, folders, attachments
        );
        Ok(())
    }

    async fn insert_lawsuit(&mut self, lawsuit: &NewLawsuit) -> Result<LawsuitId, DbError> {
        diesel::sql_query(INSERT_LAWSUIT)
            .bind::<Integer, _>(lawsuit.order)
            .bind::<Text, _>(&lawsuit.title)
            .bind::<Text, _>(&lawsuit.author)
            .bind::<Text, _>(&lawsuit.process_number)
            .bind::<Nullable<Text>, _>(&lawsuit.protocol)
            .bind::<Nullable<Text>, _>(&lawsuit.nature)
            .bind::<Nullable<Text>, _>(&lawsuit.distribution)
            .bind::<Nullable<Text>, _>(&lawsuit.judicial_district)
            .bind::<Text, _>(&lawsuit.slug)
            .bind::<Integer, _>(lawsuit.status.as_db())
            .bind::<Integer, _>(lawsuit.comment)
            .bind::<Nullable<Datetime>, _>(lawsuit.created_at)
            .bind::<Datetime, _>(lawsuit.updated_at)
            .execute(self.conn()?)
            .await?;

        Ok(LawsuitId(self.last_insert_id().await?))
    }

    async fn insert_folder(&mut self, folder: &NewFolder) -> Result<FolderId, DbError> {
        diesel::sql_query(INSERT_FOLDER)
            .bind::<Unsigned<BigInt>, _>(folder.lawsuit_id.0)
            .bind::<Integer, _>(folder.order)
            .bind::<Text, _>(&folder.title)
            .bind::<Text, _>(&folder.slug)
            .bind::<Integer, _>(folder.status.as_db())
            .bind::<Nullable<Datetime>, _>(folder.created_at)
            .bind::<Datetime, _>(folder.updated_at)
            .execute(self.conn()?)
            .await?;

        Ok(FolderId(self.last_insert_id().await?))
    }

    async fn insert_attachment(&mut self, attachment: &NewAttachment) -> Result<(), DbError> {
        diesel::sql_query(INSERT_ATTACHMENT)
            .bind::<Text, _>(attachment.owner.attachable_type())
            .bind::<Unsigned<BigInt>, _>(attachment.owner.attachable_id())
            .bind::<Text, _>(attachment.role.as_str())
            .bind::<Integer, _>(attachment.order)
            .bind::<Text, _>(&attachment.title)
            .bind::<Text, _>(&attachment.slug)
            .bind::<Text, _>(&attachment.disk)
            .bind::<Text, _>(&attachment.path)
            .bind::<Text, _>(&attachment.name)
            .bind::<Text, _>(&attachment.src)
            .bind::<Nullable<Text>, _>(&attachment.mime)
            .bind::<Integer, _>(attachment.status.as_db())
            .bind::<Nullable<Datetime>, _>(attachment.created_at)
            .bind::<Nullable<Datetime>, _>(attachment.updated_at)
            .execute(self.conn()?)
            .await?;

        Ok(())
    }

    async fn close(&mut self) -> Result<(), DbError> {
        if self.conn.take().is_some() {
            debug!("Closed valor destination connection");
        }
        Ok(())
    }
}
