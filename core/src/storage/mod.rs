//! Persistence of schema versions and their computed diffs

use crate::error::Result;
use crate::schema::NormalizedSchema;
use crate::text_diff::{Attribution, DiffBlock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod local;

pub use local::LocalVersionStore;

/// Metadata recorded alongside every stored version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub format_version: String,
    pub source: String,
    pub version: u64,
    pub created: DateTime<Utc>,
    pub author: Attribution,
    /// blake3 hex digest of the raw text, or of the schema JSON when no text was stored
    pub content_hash: String,
    #[serde(default)]
    pub parent_version: Option<u64>,
    #[serde(default)]
    pub has_schema: bool,
    #[serde(default)]
    pub has_text: bool,
}

/// Artifacts of a version about to be stored
#[derive(Debug, Clone)]
pub struct VersionInput {
    pub schema: Option<NormalizedSchema>,
    pub text: Option<String>,
    pub author: Attribution,
}

pub trait VersionStore {
    /// Store a new version, numbered one past the latest existing version
    fn save_version(&self, source: &str, input: &VersionInput) -> Result<VersionMetadata>;

    /// All versions of a source, oldest first
    fn list_versions(&self, source: &str) -> Result<Vec<VersionMetadata>>;

    /// Names of every source with at least one version
    fn list_sources(&self) -> Result<Vec<String>>;

    fn load_metadata(&self, source: &str, version: u64) -> Result<VersionMetadata>;

    fn load_schema(&self, source: &str, version: u64) -> Result<NormalizedSchema>;

    fn load_text(&self, source: &str, version: u64) -> Result<String>;

    /// Persist the textual diff that produced `version` from its parent
    fn save_diff_blocks(&self, source: &str, version: u64, blocks: &[DiffBlock]) -> Result<()>;

    fn load_diff_blocks(&self, source: &str, version: u64) -> Result<Vec<DiffBlock>>;

    fn latest_version(&self, source: &str) -> Result<Option<VersionMetadata>> {
        Ok(self.list_versions(source)?.pop())
    }
}

/// Content hash used for version metadata
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
