//! Version history: stores versions and runs both diff engines over them

use crate::change_detection::{ChangeRecord, SchemaChangeSummary, SchemaComparator};
use crate::error::{Result, VerdiffError};
use crate::storage::{VersionInput, VersionMetadata, VersionStore};
use crate::text_diff::{DiffBlock, DiffOptions, DiffStats, TextDiffEngine};
use serde::{Deserialize, Serialize};

/// Result of committing a new version
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub metadata: VersionMetadata,
    /// Textual diff against the parent, when both versions carry raw text
    pub diff_blocks: Option<Vec<DiffBlock>>,
}

/// Structural and textual differences between two stored versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionComparison {
    pub source: String,
    pub from_version: u64,
    pub to_version: u64,
    pub schema_changes: Option<Vec<ChangeRecord>>,
    pub schema_summary: Option<SchemaChangeSummary>,
    pub text_blocks: Option<Vec<DiffBlock>>,
    pub text_stats: Option<DiffStats>,
}

impl VersionComparison {
    pub fn has_changes(&self) -> bool {
        self.schema_summary.as_ref().is_some_and(SchemaChangeSummary::has_changes)
            || self.text_stats.as_ref().is_some_and(DiffStats::has_changes)
    }
}

pub struct VersionHistory<S: VersionStore> {
    store: S,
    engine: TextDiffEngine,
}

impl<S: VersionStore> VersionHistory<S> {
    pub fn new(store: S, options: DiffOptions) -> Self {
        Self {
            store,
            engine: TextDiffEngine::new(options),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store a version and persist its textual diff against the previous version
    pub fn commit(&self, source: &str, input: &VersionInput) -> Result<CommitOutcome> {
        let parent = self.store.latest_version(source)?;

        // Diff before writing so an oversized input leaves the store untouched
        let diff_blocks = match (&parent, &input.text) {
            (Some(parent), Some(text)) if parent.has_text => {
                let parent_text = self.store.load_text(source, parent.version)?;
                Some(self.engine.diff(&parent_text, text, &input.author)?)
            }
            _ => None,
        };

        let metadata = self.store.save_version(source, input)?;
        if let Some(blocks) = &diff_blocks {
            self.store.save_diff_blocks(source, metadata.version, blocks)?;
            if blocks.is_empty() {
                log::info!("Version {} of '{source}' has no textual changes", metadata.version);
            }
        }

        Ok(CommitOutcome {
            metadata,
            diff_blocks,
        })
    }

    /// Compare two stored versions; text blocks are attributed to the author of `to`
    pub fn compare(&self, source: &str, from: u64, to: u64) -> Result<VersionComparison> {
        let from_meta = self.store.load_metadata(source, from)?;
        let to_meta = self.store.load_metadata(source, to)?;

        let schema_changes = if from_meta.has_schema && to_meta.has_schema {
            let old = self.store.load_schema(source, from)?;
            let new = self.store.load_schema(source, to)?;
            Some(SchemaComparator::compare(&old, &new))
        } else {
            None
        };

        let text_blocks = if from_meta.has_text && to_meta.has_text {
            let old = self.store.load_text(source, from)?;
            let new = self.store.load_text(source, to)?;
            Some(self.engine.diff(&old, &new, &to_meta.author)?)
        } else {
            None
        };

        if schema_changes.is_none() && text_blocks.is_none() {
            return Err(VerdiffError::invalid_input(format!(
                "Versions {from} and {to} of '{source}' share no comparable artifact"
            )));
        }

        Ok(VersionComparison {
            source: source.to_string(),
            from_version: from,
            to_version: to,
            schema_summary: schema_changes.as_deref().map(SchemaChangeSummary::from_changes),
            schema_changes,
            text_stats: text_blocks.as_deref().map(DiffStats::from_blocks),
            text_blocks,
        })
    }

    /// Recompute the stored diff of `version` and check the blocks are identical
    pub fn replay(&self, source: &str, version: u64) -> Result<bool> {
        let metadata = self.store.load_metadata(source, version)?;
        let parent = metadata.parent_version.ok_or_else(|| {
            VerdiffError::invalid_input(format!(
                "Version {version} of '{source}' is the first version and has no diff"
            ))
        })?;

        let stored = self.store.load_diff_blocks(source, version)?;
        let old = self.store.load_text(source, parent)?;
        let new = self.store.load_text(source, version)?;

        self.engine.replay_matches(&old, &new, &metadata.author, &stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_detection::ChangeType;
    use crate::storage::LocalVersionStore;
    use crate::test_fixtures;
    use crate::text_diff::BlockChangeType;
    use tempfile::TempDir;

    fn history(temp_dir: &TempDir) -> VersionHistory<LocalVersionStore> {
        VersionHistory::new(
            LocalVersionStore::new(temp_dir.path().to_path_buf()),
            DiffOptions::default(),
        )
    }

    #[test]
    fn test_commit_persists_diff_against_parent() {
        let temp_dir = TempDir::new().unwrap();
        let history = history(&temp_dir);

        let first = history
            .commit(
                "blog",
                &VersionInput {
                    schema: None,
                    text: Some("a\nb\nc".to_string()),
                    author: test_fixtures::other_editor(),
                },
            )
            .unwrap();
        assert!(first.diff_blocks.is_none());

        let second = history
            .commit(
                "blog",
                &VersionInput {
                    schema: None,
                    text: Some("a\nx\nc".to_string()),
                    author: test_fixtures::editor(),
                },
            )
            .unwrap();

        let blocks = second.diff_blocks.unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].change_type, BlockChangeType::Modified);
        assert_eq!(blocks[0].edited_by_user_id, "u-42");
        assert_eq!(history.store().load_diff_blocks("blog", 2).unwrap(), blocks);
        assert!(history.replay("blog", 2).unwrap());
    }

    #[test]
    fn test_compare_runs_both_engines() {
        let temp_dir = TempDir::new().unwrap();
        let history = history(&temp_dir);

        for (schema, text, author) in [
            (test_fixtures::blog_schema(), "users\nposts\nsessions", test_fixtures::other_editor()),
            (test_fixtures::blog_schema_v2(), "users\nposts\ntags", test_fixtures::editor()),
        ] {
            history
                .commit(
                    "blog",
                    &VersionInput {
                        schema: Some(schema),
                        text: Some(text.to_string()),
                        author,
                    },
                )
                .unwrap();
        }

        let comparison = history.compare("blog", 1, 2).unwrap();
        assert!(comparison.has_changes());

        let changes = comparison.schema_changes.unwrap();
        assert_eq!(changes[0].change_type(), ChangeType::TableAdded);
        assert_eq!(comparison.schema_summary.unwrap().total_changes(), changes.len());

        let blocks = comparison.text_blocks.unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].edited_by_username, "Grace Hopper");
        assert_eq!(comparison.text_stats.unwrap().modified, 1);

        let same = history.compare("blog", 2, 2).unwrap();
        assert!(!same.has_changes());
    }

    #[test]
    fn test_replay_detects_tampered_diff() {
        let temp_dir = TempDir::new().unwrap();
        let history = history(&temp_dir);

        for text in ["a\nb", "a\nb\nc\nd"] {
            history
                .commit(
                    "app",
                    &VersionInput {
                        schema: None,
                        text: Some(text.to_string()),
                        author: test_fixtures::editor(),
                    },
                )
                .unwrap();
        }

        let mut stored = history.store().load_diff_blocks("app", 2).unwrap();
        stored[0].block_end += 1;
        history.store().save_diff_blocks("app", 2, &stored).unwrap();

        assert!(!history.replay("app", 2).unwrap());
        assert!(history.replay("app", 1).is_err());
    }

    #[test]
    fn test_oversized_commit_leaves_store_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let history = VersionHistory::new(
            LocalVersionStore::new(temp_dir.path().to_path_buf()),
            DiffOptions {
                max_lines: Some(2),
                ..DiffOptions::default()
            },
        );
        let input = |text: &str| VersionInput {
            schema: None,
            text: Some(text.to_string()),
            author: test_fixtures::editor(),
        };

        history.commit("app", &input("a")).unwrap();
        let err = history.commit("app", &input("a\nb\nc")).unwrap_err();

        assert!(matches!(err, VerdiffError::InputTooLarge { side: "new", .. }));
        assert_eq!(history.store().list_versions("app").unwrap().len(), 1);
    }
}
