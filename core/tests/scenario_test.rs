//! End-to-end scenarios for the structural comparator and the text diff engine
use verdiff_core::change_detection::{ChangeDetails, ChangeType, ColumnDiff, SchemaChangeSummary};
use verdiff_core::text_diff::DiffOptions;
use verdiff_core::{
    diff_lines, BlockChangeType, DiffStats, NormalizedSchema, SchemaComparator, TextDiffEngine,
    VerdiffError,
};

mod common;
use common::{author, TestFixtures};

#[test]
fn test_new_table_and_column() {
    let fixtures = TestFixtures::new();
    let old = fixtures.schema("shop_v1.json");
    let new = fixtures.schema("shop_v2.json");

    let changes = SchemaComparator::compare(&old, &new);

    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].change_type(), ChangeType::TableAdded);
    assert_eq!(changes[0].entity_name, "orders");
    assert_eq!(changes[1].change_type(), ChangeType::ColumnAdded);
    assert_eq!(changes[1].entity_name, "users.name");
    match &changes[1].details {
        ChangeDetails::ColumnAdded { data_type, .. } => assert_eq!(data_type, "varchar"),
        other => panic!("Expected ColumnAdded, got {other:?}"),
    }
}

#[test]
fn test_type_nullability_and_relation_changes() {
    let fixtures = TestFixtures::new();
    let old = fixtures.schema("shop_v2.json");
    let new = fixtures.schema("shop_v3.json");

    let changes = SchemaComparator::compare(&old, &new);
    let rendered: Vec<(ChangeType, &str)> = changes
        .iter()
        .map(|c| (c.change_type(), c.entity_name.as_str()))
        .collect();

    assert_eq!(
        rendered,
        vec![
            (ChangeType::ColumnModified, "users.id"),
            (ChangeType::ColumnModified, "users.email"),
            (ChangeType::ColumnAdded, "orders.user_id"),
            (ChangeType::RelationAdded, "orders.user_id->users.id"),
        ]
    );

    let diffs: Vec<ColumnDiff> = changes
        .iter()
        .filter_map(|c| match &c.details {
            ChangeDetails::ColumnModified { diff, .. } => Some(*diff),
            _ => None,
        })
        .collect();
    assert_eq!(diffs, vec![ColumnDiff::Type, ColumnDiff::Nullability]);

    let summary = SchemaChangeSummary::from_changes(&changes);
    assert_eq!(summary.columns_modified, 2);
    assert_eq!(summary.relations_modified, 0);
}

#[test]
fn test_reverse_comparison_reports_removals() {
    let fixtures = TestFixtures::new();
    let old = fixtures.schema("shop_v2.json");
    let new = fixtures.schema("shop_v1.json");

    let changes = SchemaComparator::compare(&old, &new);
    let kinds: Vec<ChangeType> = changes.iter().map(|c| c.change_type()).collect();

    // The removed table's columns are implied, not listed
    assert_eq!(kinds, vec![ChangeType::TableRemoved, ChangeType::ColumnRemoved]);
    assert_eq!(changes[0].entity_name, "orders");
    assert_eq!(changes[1].entity_name, "users.name");
}

#[test]
fn test_invalid_schema_fails_fast() {
    let fixtures = TestFixtures::new();
    let err = NormalizedSchema::load(&fixtures.schema_path("invalid_relation.json")).unwrap_err();
    assert!(matches!(err, VerdiffError::InvalidSchema(_)));
    assert!(err.to_string().contains("invalid_relation.json"));
}

#[test]
fn test_schema_text_diff() {
    let fixtures = TestFixtures::new();
    let old = fixtures.text("shop_v1.prisma");
    let new = fixtures.text("shop_v2.prisma");

    let blocks = diff_lines(&old, &new, &author());

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].change_type, BlockChangeType::Modified);
    assert_eq!((blocks[0].block_start, blocks[0].block_end), (2, 4));
    assert_eq!(
        blocks[0].before_text.as_deref(),
        Some("  id    Int    @id\n  email String @unique")
    );
    assert_eq!(blocks[1].change_type, BlockChangeType::Added);
    assert_eq!((blocks[1].block_start, blocks[1].block_end), (7, 10));
    assert!(blocks.iter().all(|b| b.edited_by_user_id == "u-100"));
    assert_eq!(blocks.iter().map(|b| b.block_index).collect::<Vec<_>>(), vec![0, 1]);

    let stats = DiffStats::from_blocks(&blocks);
    assert_eq!(stats, DiffStats { added: 4, removed: 0, modified: 3 });
}

#[test]
fn test_diff_is_idempotent() {
    let fixtures = TestFixtures::new();
    let text = fixtures.text("shop_v2.prisma");
    let schema = fixtures.schema("shop_v3.json");

    assert!(diff_lines(&text, &text, &author()).is_empty());
    assert!(SchemaComparator::compare(&schema, &schema).is_empty());

    let old = fixtures.text("shop_v1.prisma");
    assert_eq!(diff_lines(&old, &text, &author()), diff_lines(&old, &text, &author()));
}

#[test]
fn test_blocks_survive_json_round_trip() {
    let fixtures = TestFixtures::new();
    let old = fixtures.text("shop_v1.prisma");
    let new = fixtures.text("shop_v2.prisma");
    let engine = TextDiffEngine::new(DiffOptions::default());

    let blocks = engine.diff(&old, &new, &author()).unwrap();
    let json = serde_json::to_string(&blocks).unwrap();
    let restored: Vec<verdiff_core::DiffBlock> = serde_json::from_str(&json).unwrap();

    assert!(engine.replay_matches(&old, &new, &author(), &restored).unwrap());
}
