//! Output formatting utilities

use serde::Serialize;
use verdiff_core::change_detection::{ColumnValue, SchemaChangeSummary};
use verdiff_core::config::{Config, ConfigResolutionInfo};
use verdiff_core::error::Result;
use verdiff_core::history::VersionComparison;
use verdiff_core::storage::VersionMetadata;
use verdiff_core::{BlockChangeType, ChangeDetails, ChangeRecord, DiffBlock, DiffStats};

/// Pretty printer for verdiff output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print structural changes between two schemas
    pub fn print_schema_changes(changes: &[ChangeRecord], from: &str, to: &str) {
        println!("🔍 Schema changes: {from} → {to}");
        if changes.is_empty() {
            println!("└─ ✅ No changes detected");
            return;
        }

        let summary = SchemaChangeSummary::from_changes(changes);
        for (i, change) in changes.iter().enumerate() {
            let prefix = if i == changes.len() - 1 { "└─" } else { "├─" };
            println!("{prefix} {}", change_label(change));
        }
        println!();
        println!(
            "{} changes: {} tables added, {} removed; {} columns added, {} removed, {} modified; {} relations added, {} removed",
            summary.total_changes(),
            summary.tables_added,
            summary.tables_removed,
            summary.columns_added,
            summary.columns_removed,
            summary.columns_modified,
            summary.relations_added,
            summary.relations_removed,
        );
    }

    /// Print attributed diff blocks
    pub fn print_diff_blocks(blocks: &[DiffBlock], from: &str, to: &str) {
        println!("🔍 Text diff: {from} → {to}");
        if blocks.is_empty() {
            println!("└─ ✅ No changes detected");
            return;
        }

        for block in blocks {
            println!(
                "@@ block {} · {} lines {}-{} · by {} ({})",
                block.block_index,
                block_kind(block.change_type),
                block.block_start,
                block.block_end,
                block.edited_by_username,
                block.edited_by_user_id
            );
            if let Some(before) = &block.before_text {
                for line in before.split('\n') {
                    println!("- {line}");
                }
            }
            if let Some(after) = &block.after_text {
                for line in after.split('\n') {
                    println!("+ {line}");
                }
            }
        }
        println!();
        Self::print_stats(&DiffStats::from_blocks(blocks));
    }

    pub fn print_stats(stats: &DiffStats) {
        println!("📊 Lines changed: {}", stats.total());
        println!("├─ Added: {}", stats.added);
        println!("├─ Removed: {}", stats.removed);
        println!("└─ Modified: {}", stats.modified);
    }

    /// Print the versions of a source
    pub fn print_version_log(source: &str, versions: &[VersionMetadata]) {
        if versions.is_empty() {
            println!("No versions found for '{source}'.");
            return;
        }

        println!("📸 Versions of '{source}':");
        for (i, version) in versions.iter().enumerate() {
            let prefix = if i == versions.len() - 1 { "└─" } else { "├─" };
            let mut artifacts = Vec::new();
            if version.has_schema {
                artifacts.push("schema");
            }
            if version.has_text {
                artifacts.push("text");
            }
            println!(
                "{prefix} v{} · {} · {} · [{}] · {}",
                version.version,
                version.created.format("%Y-%m-%d %H:%M:%S"),
                version.author.username,
                artifacts.join(", "),
                &version.content_hash[..12.min(version.content_hash.len())]
            );
        }
    }

    /// Print a stored-version comparison
    pub fn print_comparison(comparison: &VersionComparison) {
        let from = format!("v{}", comparison.from_version);
        let to = format!("v{}", comparison.to_version);

        match &comparison.schema_changes {
            Some(changes) => Self::print_schema_changes(changes, &from, &to),
            None => println!("ℹ️  Schema: not stored on both versions"),
        }
        println!();
        match &comparison.text_blocks {
            Some(blocks) => Self::print_diff_blocks(blocks, &from, &to),
            None => println!("ℹ️  Text: not stored on both versions"),
        }
    }

    pub fn print_config(config: &Config, info: &ConfigResolutionInfo) {
        println!("⚙️  verdiff configuration");
        println!(
            "├─ Source: {} {}",
            info.config_source,
            info.config_path.as_deref().unwrap_or("")
        );
        println!("├─ Merge gap: {}", config.diff.merge_gap);
        println!(
            "├─ Max lines: {}",
            config
                .diff
                .max_lines
                .map_or("unlimited".to_string(), |n| n.to_string())
        );
        println!("├─ Store: {}", config.store.path.display());
        println!("├─ Identities: {}", config.identities.len());
        for source in &info.identity_sources {
            println!("│  └─ from {source}");
        }
        println!("└─ Resolution order:");
        for (i, step) in info.resolution_order.iter().enumerate() {
            let prefix = if i == info.resolution_order.len() - 1 { "   └─" } else { "   ├─" };
            println!("{prefix} {step}");
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    pub fn format_text_diff(blocks: &[DiffBlock]) -> Result<String> {
        let json = serde_json::json!({
            "blocks": blocks,
            "stats": DiffStats::from_blocks(blocks),
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

fn block_kind(change_type: BlockChangeType) -> &'static str {
    match change_type {
        BlockChangeType::Added => "added",
        BlockChangeType::Modified => "modified",
        BlockChangeType::Removed => "removed",
    }
}

fn column_value(value: &ColumnValue) -> String {
    match value {
        ColumnValue::Type(data_type) => data_type.clone(),
        ColumnValue::Nullable(true) => "NULL".to_string(),
        ColumnValue::Nullable(false) => "NOT NULL".to_string(),
    }
}

/// One-line human description of a change record
pub fn change_label(change: &ChangeRecord) -> String {
    let entity = &change.entity_name;
    match &change.details {
        ChangeDetails::TableAdded { .. } => format!("➕ table {entity}"),
        ChangeDetails::TableRemoved { .. } => format!("➖ table {entity}"),
        ChangeDetails::ColumnAdded { data_type, .. } => format!("➕ column {entity} ({data_type})"),
        ChangeDetails::ColumnRemoved { .. } => format!("➖ column {entity}"),
        ChangeDetails::ColumnModified { old, new, .. } => format!(
            "✏️  column {entity}: {} → {}",
            column_value(old),
            column_value(new)
        ),
        ChangeDetails::RelationAdded { relation, .. } => match &relation.relation_type {
            Some(kind) => format!("➕ relation {entity} ({kind})"),
            None => format!("➕ relation {entity}"),
        },
        ChangeDetails::RelationRemoved { .. } => format!("➖ relation {entity}"),
        ChangeDetails::RelationModified { .. } => format!("✏️  relation {entity}"),
    }
}
