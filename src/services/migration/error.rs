//! Migration error types.

use thiserror::Error;

use crate::repository::DbError;

/// Fatal migration failure, classified by the side that failed.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Reading the legacy DocMan database failed (including connecting).
    #[error("Source query failed: {0}")]
    SourceQuery(#[source] DbError),
    /// Purging or inserting into the valor database failed (including connecting).
    #[error("Destination write failed: {0}")]
    DestinationWrite(#[source] DbError),
}

impl MigrationError {
    pub fn is_source(&self) -> bool {
        matches!(self, Self::SourceQuery(_))
    }

    pub fn is_destination(&self) -> bool {
        matches!(self, Self::DestinationWrite(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::to_diesel_error;

    #[test]
    fn test_display_names_the_failing_side() {
        let err = MigrationError::SourceQuery(to_diesel_error("table missing"));
        assert!(err.is_source());
        assert!(err.to_string().starts_with("Source query failed:"));

        let err = MigrationError::DestinationWrite(to_diesel_error("duplicate key"));
        assert!(err.is_destination());
        assert!(err.to_string().contains("duplicate key"));
    }
}
