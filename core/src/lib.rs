//! # verdiff-core
//!
//! Core library for verdiff - a version diff engine for database schemas. It compares
//! two normalized schema snapshots into typed change records, and two raw-text
//! versions of a schema definition into attributed change blocks.
//!
//! This crate provides the core functionality that can be used by different interfaces
//! (CLI, web APIs, change-tracking feeds, etc.).

pub mod change_detection;
pub mod config;
pub mod error;
pub mod history;
pub mod identity;
pub mod schema;
pub mod storage;
pub mod text_diff;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_fixtures;

// Re-export the most commonly used types for convenience
pub use change_detection::{ChangeDetails, ChangeRecord, ChangeType, SchemaComparator};
pub use config::Config;
pub use error::{Result, VerdiffError};
pub use history::{VersionComparison, VersionHistory};
pub use identity::{IdentityResolver, StaticIdentityResolver};
pub use schema::{ColumnDefinition, NormalizedSchema, Relation, TableDefinition};
pub use storage::{LocalVersionStore, VersionStore};
pub use text_diff::{diff_lines, Attribution, BlockChangeType, DiffBlock, DiffStats, TextDiffEngine};

/// Current format version for stored verdiff files
pub const FORMAT_VERSION: &str = "1.0.0";
