//! Integration tests for the version history workflow
//! Tests the complete flow: commit → compare → replay
use verdiff_core::history::VersionHistory;
use verdiff_core::storage::{VersionInput, VersionStore};
use verdiff_core::text_diff::DiffOptions;
use verdiff_core::{BlockChangeType, ChangeType, VerdiffError};

mod common;
use common::{author, reviewer, TestFixtures, TestStore};

#[test]
fn test_complete_workflow() {
    let fixtures = TestFixtures::new();
    let test_store = TestStore::new();
    let history = VersionHistory::new(test_store.store.clone(), DiffOptions::default());

    let v1 = history
        .commit(
            "shop",
            &VersionInput {
                schema: Some(fixtures.schema("shop_v1.json")),
                text: Some(fixtures.text("shop_v1.prisma")),
                author: author(),
            },
        )
        .unwrap();
    assert_eq!(v1.metadata.version, 1);
    assert!(v1.diff_blocks.is_none());

    let v2 = history
        .commit(
            "shop",
            &VersionInput {
                schema: Some(fixtures.schema("shop_v2.json")),
                text: Some(fixtures.text("shop_v2.prisma")),
                author: reviewer(),
            },
        )
        .unwrap();
    assert_eq!(v2.metadata.parent_version, Some(1));
    assert_ne!(v1.metadata.content_hash, v2.metadata.content_hash);

    let blocks = v2.diff_blocks.unwrap();
    assert_eq!(blocks.len(), 2);
    assert!(blocks.iter().all(|b| b.edited_by_username == "Edsger Dijkstra"));

    let comparison = history.compare("shop", 1, 2).unwrap();
    let changes = comparison.schema_changes.as_ref().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].change_type(), ChangeType::TableAdded);
    assert_eq!(comparison.text_blocks.as_ref().unwrap(), &blocks);

    assert!(history.replay("shop", 2).unwrap());
}

#[test]
fn test_schema_only_versions_have_no_text_diff() {
    let fixtures = TestFixtures::new();
    let test_store = TestStore::new();
    let history = VersionHistory::new(test_store.store.clone(), DiffOptions::default());

    for name in ["shop_v1.json", "shop_v3.json"] {
        let outcome = history
            .commit(
                "shop",
                &VersionInput {
                    schema: Some(fixtures.schema(name)),
                    text: None,
                    author: author(),
                },
            )
            .unwrap();
        assert!(outcome.diff_blocks.is_none());
    }

    let comparison = history.compare("shop", 1, 2).unwrap();
    assert!(comparison.text_blocks.is_none());
    assert!(comparison.has_changes());

    let err = history.replay("shop", 2).unwrap_err();
    assert!(matches!(err, VerdiffError::MissingArtifact { .. }));
}

#[test]
fn test_text_only_history_and_unknown_versions() {
    let test_store = TestStore::new();
    let history = VersionHistory::new(test_store.store.clone(), DiffOptions::default());

    for text in ["a\nb\nc", "a\nb\nc", "a\nc"] {
        history
            .commit(
                "notes",
                &VersionInput {
                    schema: None,
                    text: Some(text.to_string()),
                    author: author(),
                },
            )
            .unwrap();
    }

    let versions = test_store.store.list_versions("notes").unwrap();
    assert_eq!(versions.len(), 3);
    assert_eq!(versions[0].content_hash, versions[1].content_hash);
    assert!(test_store.store.load_diff_blocks("notes", 2).unwrap().is_empty());

    let removed = test_store.store.load_diff_blocks("notes", 3).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].change_type, BlockChangeType::Removed);
    assert_eq!((removed[0].block_start, removed[0].block_end), (2, 2));

    let err = history.compare("notes", 1, 7).unwrap_err();
    assert!(matches!(err, VerdiffError::VersionNotFound { version: 7, .. }));
}
