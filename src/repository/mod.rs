//! Repository layer for database persistence.
//!
//! Both databases are MySQL and are reached through diesel-async with raw
//! SQL: the legacy DocMan schema is read, the valor schema is written.

pub mod docman;
pub mod docman_models;
pub mod migration;
pub mod pool;
pub mod recording;
pub mod util;
pub mod valor;

pub use docman::{DocmanQueries, DocmanSource};
pub use migration::{DestinationWriter, SourceReader};
pub use pool::{is_mysql_url, DbError, MysqlPool};
pub use recording::RecordingDestination;
pub use util::{redact_url_password, to_diesel_error};
pub use valor::ValorDestination;
