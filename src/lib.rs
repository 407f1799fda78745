//! DocMan to valor lawsuit migration library.
//!
//! The pipeline reads top-level DocMan categories as lawsuits, their child
//! categories as folders and the enabled documents inside each folder as
//! attachments, and writes them into the valor lawsuit schema.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod services;
