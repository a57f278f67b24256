use super::{content_hash, VersionInput, VersionMetadata, VersionStore};
use crate::error::{Result, VerdiffError};
use crate::schema::NormalizedSchema;
use crate::text_diff::DiffBlock;
use crate::FORMAT_VERSION;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

const METADATA_FILE: &str = "metadata.json";
const SCHEMA_FILE: &str = "schema.json";
const TEXT_FILE: &str = "schema.txt";
const DIFF_FILE: &str = "diff.json";

/// Filesystem-backed version store.
///
/// Layout: `<base>/sources/<source>/v<N>/{metadata.json, schema.json, schema.txt, diff.json}`
#[derive(Debug, Clone)]
pub struct LocalVersionStore {
    base_path: PathBuf,
}

impl LocalVersionStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn source_dir(&self, source: &str) -> Result<PathBuf> {
        validate_source_name(source)?;
        Ok(self.base_path.join("sources").join(source))
    }

    fn version_dir(&self, source: &str, version: u64) -> Result<PathBuf> {
        Ok(self.source_dir(source)?.join(format!("v{version}")))
    }

    /// Path of an artifact inside an existing version directory
    fn artifact_path(&self, source: &str, version: u64, file: &str) -> Result<PathBuf> {
        let dir = self.version_dir(source, version)?;
        if !dir.join(METADATA_FILE).exists() {
            return Err(VerdiffError::VersionNotFound {
                source_name: source.to_string(),
                version,
            });
        }
        Ok(dir.join(file))
    }

    fn read_artifact(&self, source: &str, version: u64, file: &str, artifact: &'static str) -> Result<String> {
        let path = self.artifact_path(source, version, file)?;
        if !path.exists() {
            return Err(VerdiffError::MissingArtifact {
                source_name: source.to_string(),
                version,
                artifact,
            });
        }
        Ok(fs::read_to_string(path)?)
    }
}

fn validate_source_name(source: &str) -> Result<()> {
    if source.is_empty()
        || source == "."
        || source == ".."
        || source.contains(['/', '\\'])
    {
        return Err(VerdiffError::invalid_input(format!(
            "'{source}' is not a valid source name"
        )));
    }
    Ok(())
}

fn parse_version_dir(name: &str) -> Option<u64> {
    name.strip_prefix('v')?.parse().ok()
}

impl VersionStore for LocalVersionStore {
    fn save_version(&self, source: &str, input: &VersionInput) -> Result<VersionMetadata> {
        let schema_json = input
            .schema
            .as_ref()
            .map(NormalizedSchema::to_json_pretty)
            .transpose()?;

        let hash = input
            .text
            .as_deref()
            .or(schema_json.as_deref())
            .map(|content| content_hash(content.as_bytes()))
            .ok_or_else(|| {
                VerdiffError::invalid_input("A version needs a schema, a raw text, or both")
            })?;

        let parent_version = self.latest_version(source)?.map(|m| m.version);
        let version = parent_version.map_or(1, |v| v + 1);
        let dir = self.version_dir(source, version)?;
        fs::create_dir_all(&dir)?;

        if let Some(json) = &schema_json {
            fs::write(dir.join(SCHEMA_FILE), json)?;
        }
        if let Some(text) = &input.text {
            fs::write(dir.join(TEXT_FILE), text)?;
        }

        let metadata = VersionMetadata {
            format_version: FORMAT_VERSION.to_string(),
            source: source.to_string(),
            version,
            created: Utc::now(),
            author: input.author.clone(),
            content_hash: hash,
            parent_version,
            has_schema: schema_json.is_some(),
            has_text: input.text.is_some(),
        };
        // Metadata last: its presence marks the version as complete
        fs::write(dir.join(METADATA_FILE), serde_json::to_string_pretty(&metadata)?)?;

        log::info!(
            "Stored version {version} of '{source}' by {} at {}",
            metadata.author.user_id,
            dir.display()
        );
        Ok(metadata)
    }

    fn list_versions(&self, source: &str) -> Result<Vec<VersionMetadata>> {
        let source_dir = self.source_dir(source)?;
        let mut versions = Vec::new();

        if source_dir.exists() {
            for entry in fs::read_dir(&source_dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let Some(version) = entry.file_name().to_str().and_then(parse_version_dir) else {
                    continue;
                };
                if entry.path().join(METADATA_FILE).exists() {
                    versions.push(self.load_metadata(source, version)?);
                } else {
                    log::warn!("Skipping incomplete version directory {}", entry.path().display());
                }
            }
        }

        versions.sort_by_key(|m| m.version);
        Ok(versions)
    }

    fn list_sources(&self) -> Result<Vec<String>> {
        let sources_dir = self.base_path.join("sources");
        let mut sources = Vec::new();

        if sources_dir.exists() {
            for entry in fs::read_dir(sources_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        sources.push(name.to_string());
                    }
                }
            }
        }

        sources.sort();
        Ok(sources)
    }

    fn load_metadata(&self, source: &str, version: u64) -> Result<VersionMetadata> {
        let path = self.artifact_path(source, version, METADATA_FILE)?;
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn load_schema(&self, source: &str, version: u64) -> Result<NormalizedSchema> {
        let content = self.read_artifact(source, version, SCHEMA_FILE, "schema")?;
        NormalizedSchema::from_json_str(&content)
    }

    fn load_text(&self, source: &str, version: u64) -> Result<String> {
        self.read_artifact(source, version, TEXT_FILE, "raw text")
    }

    fn save_diff_blocks(&self, source: &str, version: u64, blocks: &[DiffBlock]) -> Result<()> {
        let path = self.artifact_path(source, version, DIFF_FILE)?;
        fs::write(&path, serde_json::to_string_pretty(blocks)?)?;
        log::debug!("Persisted {} diff blocks to {}", blocks.len(), path.display());
        Ok(())
    }

    fn load_diff_blocks(&self, source: &str, version: u64) -> Result<Vec<DiffBlock>> {
        let content = self.read_artifact(source, version, DIFF_FILE, "stored diff")?;
        Ok(serde_json::from_str(&content)?)
    }
}
