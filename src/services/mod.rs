//! Service layer for the migration logic.
//!
//! This module contains domain logic separated from UI concerns.

pub mod metadata;
pub mod migration;

pub use metadata::{extract, Extraction, ExtractionAnomaly, MetadataField};
pub use migration::{
    MigrationConfig, MigrationError, MigrationEvent, MigrationProgress, MigrationReport,
    MigrationService,
};
