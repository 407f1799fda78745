//! MySQL connection handling.
//!
//! The migration holds exactly one connection per database for the whole
//! run, so this is a connection factory rather than a real pool.

use diesel_async::{AsyncConnection, AsyncMysqlConnection};

use super::util::to_diesel_error;

/// Diesel error type alias.
pub type DbError = diesel::result::Error;

/// Async MySQL connection type.
pub type MysqlConn = AsyncMysqlConnection;

/// MySQL connection factory (creates connections on demand).
#[derive(Clone)]
pub struct MysqlPool {
    database_url: String,
}

impl MysqlPool {
    /// Create a new MySQL connection factory.
    ///
    /// `mariadb://` URLs are accepted and rewritten to `mysql://`.
    pub fn new(database_url: &str) -> Self {
        let url = match database_url.strip_prefix("mariadb://") {
            Some(rest) => format!("mysql://{rest}"),
            None => database_url.to_string(),
        };
        Self { database_url: url }
    }

    /// Open a new connection.
    pub async fn get(&self) -> Result<MysqlConn, DbError> {
        MysqlConn::establish(&self.database_url)
            .await
            .map_err(to_diesel_error)
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Check whether a URL points at a MySQL-compatible server.
pub fn is_mysql_url(url: &str) -> bool {
    url.starts_with("mysql://") || url.starts_with("mariadb://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mariadb_scheme_is_rewritten() {
        let pool = MysqlPool::new("mariadb://root@localhost/site");
        assert_eq!(pool.database_url(), "mysql://root@localhost/site");

        let pool = MysqlPool::new("mysql://root@localhost/site");
        assert_eq!(pool.database_url(), "mysql://root@localhost/site");
    }

    #[test]
    fn test_url_detection() {
        assert!(is_mysql_url("mysql://localhost/db"));
        assert!(is_mysql_url("mariadb://localhost/db"));
        assert!(!is_mysql_url("postgres://localhost/db"));
        assert!(!is_mysql_url("/var/lib/site.db"));
    }
}
