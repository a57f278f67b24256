//! Structural change detection between two normalized schema versions

use crate::schema::{ColumnDefinition, NormalizedSchema, Relation, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structural comparator for normalized schemas
pub struct SchemaComparator;

/// Kind of a structural change, as persisted in `change_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    TableAdded,
    TableRemoved,
    ColumnAdded,
    ColumnRemoved,
    ColumnModified,
    RelationAdded,
    RelationRemoved,
    RelationModified,
}

/// Which attribute of a column changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDiff {
    Type,
    Nullability,
}

/// Old or new value of a modified column attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Type(String),
    Nullable(bool),
}

/// Kind-specific payload of a change record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change_type", content = "details", rename_all = "snake_case")]
pub enum ChangeDetails {
    TableAdded {
        table: String,
    },
    TableRemoved {
        table: String,
    },
    ColumnAdded {
        table: String,
        column: String,
        #[serde(rename = "type")]
        data_type: String,
    },
    ColumnRemoved {
        table: String,
        column: String,
    },
    ColumnModified {
        table: String,
        column: String,
        diff: ColumnDiff,
        old: ColumnValue,
        new: ColumnValue,
    },
    RelationAdded {
        table: String,
        relation: Relation,
    },
    RelationRemoved {
        table: String,
        relation: Relation,
    },
    /// Never produced: relations are identified by their full `(from, to)` pair,
    /// so a changed relation surfaces as a removal plus an addition.
    RelationModified {
        table: String,
        old: Relation,
        new: Relation,
    },
}

/// A single structural change between two schema versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(flatten)]
    pub details: ChangeDetails,
    pub entity_name: String,
}

/// Per-kind counts over a list of change records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChangeSummary {
    pub tables_added: usize,
    pub tables_removed: usize,
    pub columns_added: usize,
    pub columns_removed: usize,
    pub columns_modified: usize,
    pub relations_added: usize,
    pub relations_removed: usize,
    pub relations_modified: usize,
}

impl ChangeDetails {
    pub fn change_type(&self) -> ChangeType {
        match self {
            ChangeDetails::TableAdded { .. } => ChangeType::TableAdded,
            ChangeDetails::TableRemoved { .. } => ChangeType::TableRemoved,
            ChangeDetails::ColumnAdded { .. } => ChangeType::ColumnAdded,
            ChangeDetails::ColumnRemoved { .. } => ChangeType::ColumnRemoved,
            ChangeDetails::ColumnModified { .. } => ChangeType::ColumnModified,
            ChangeDetails::RelationAdded { .. } => ChangeType::RelationAdded,
            ChangeDetails::RelationRemoved { .. } => ChangeType::RelationRemoved,
            ChangeDetails::RelationModified { .. } => ChangeType::RelationModified,
        }
    }
}

impl ChangeRecord {
    fn table_added(table: &str) -> Self {
        Self {
            entity_name: table.to_string(),
            details: ChangeDetails::TableAdded {
                table: table.to_string(),
            },
        }
    }

    fn table_removed(table: &str) -> Self {
        Self {
            entity_name: table.to_string(),
            details: ChangeDetails::TableRemoved {
                table: table.to_string(),
            },
        }
    }

    fn column_added(table: &str, column: &str, definition: &ColumnDefinition) -> Self {
        Self {
            entity_name: format!("{table}.{column}"),
            details: ChangeDetails::ColumnAdded {
                table: table.to_string(),
                column: column.to_string(),
                data_type: definition.data_type.clone(),
            },
        }
    }

    fn column_removed(table: &str, column: &str) -> Self {
        Self {
            entity_name: format!("{table}.{column}"),
            details: ChangeDetails::ColumnRemoved {
                table: table.to_string(),
                column: column.to_string(),
            },
        }
    }

    fn column_modified(
        table: &str,
        column: &str,
        diff: ColumnDiff,
        old: ColumnValue,
        new: ColumnValue,
    ) -> Self {
        Self {
            entity_name: format!("{table}.{column}"),
            details: ChangeDetails::ColumnModified {
                table: table.to_string(),
                column: column.to_string(),
                diff,
                old,
                new,
            },
        }
    }

    fn relation_added(table: &str, relation: &Relation) -> Self {
        Self {
            entity_name: relation.key(),
            details: ChangeDetails::RelationAdded {
                table: table.to_string(),
                relation: relation.clone(),
            },
        }
    }

    fn relation_removed(table: &str, relation: &Relation) -> Self {
        Self {
            entity_name: relation.key(),
            details: ChangeDetails::RelationRemoved {
                table: table.to_string(),
                relation: relation.clone(),
            },
        }
    }

    pub fn change_type(&self) -> ChangeType {
        self.details.change_type()
    }
}

impl SchemaComparator {
    /// Compare two schema versions.
    ///
    /// Output order: table additions (new order), table removals (old order), then for
    /// every table present in both versions (new order) its column additions, column
    /// removals, column modifications, relation additions and relation removals.
    pub fn compare(old: &NormalizedSchema, new: &NormalizedSchema) -> Vec<ChangeRecord> {
        let mut changes = Vec::new();

        for name in new.tables.keys() {
            if !old.tables.contains_key(name) {
                changes.push(ChangeRecord::table_added(name));
            }
        }

        for name in old.tables.keys() {
            if !new.tables.contains_key(name) {
                changes.push(ChangeRecord::table_removed(name));
            }
        }

        for (name, new_table) in &new.tables {
            if let Some(old_table) = old.tables.get(name) {
                Self::compare_columns(name, old_table, new_table, &mut changes);
                Self::compare_relations(name, old_table, new_table, &mut changes);
            }
        }

        log::debug!(
            "Compared schemas ({} -> {} tables): {} changes",
            old.len(),
            new.len(),
            changes.len()
        );

        changes
    }

    fn compare_columns(
        table: &str,
        old_table: &TableDefinition,
        new_table: &TableDefinition,
        changes: &mut Vec<ChangeRecord>,
    ) {
        for (column, definition) in &new_table.columns {
            if !old_table.columns.contains_key(column) {
                changes.push(ChangeRecord::column_added(table, column, definition));
            }
        }

        for column in old_table.columns.keys() {
            if !new_table.columns.contains_key(column) {
                changes.push(ChangeRecord::column_removed(table, column));
            }
        }

        for (column, new_def) in &new_table.columns {
            let Some(old_def) = old_table.columns.get(column) else {
                continue;
            };

            // A type change masks a nullability change on the same column
            if old_def.data_type != new_def.data_type {
                changes.push(ChangeRecord::column_modified(
                    table,
                    column,
                    ColumnDiff::Type,
                    ColumnValue::Type(old_def.data_type.clone()),
                    ColumnValue::Type(new_def.data_type.clone()),
                ));
            } else if old_def.nullable != new_def.nullable {
                changes.push(ChangeRecord::column_modified(
                    table,
                    column,
                    ColumnDiff::Nullability,
                    ColumnValue::Nullable(old_def.nullable),
                    ColumnValue::Nullable(new_def.nullable),
                ));
            }
        }
    }

    fn compare_relations(
        table: &str,
        old_table: &TableDefinition,
        new_table: &TableDefinition,
        changes: &mut Vec<ChangeRecord>,
    ) {
        let old_keys: HashSet<String> = old_table.relations.iter().map(Relation::key).collect();
        let new_keys: HashSet<String> = new_table.relations.iter().map(Relation::key).collect();

        for relation in &new_table.relations {
            if !old_keys.contains(&relation.key()) {
                changes.push(ChangeRecord::relation_added(table, relation));
            }
        }

        for relation in &old_table.relations {
            if !new_keys.contains(&relation.key()) {
                changes.push(ChangeRecord::relation_removed(table, relation));
            }
        }
    }
}

impl SchemaChangeSummary {
    pub fn from_changes(changes: &[ChangeRecord]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            let counter = match change.change_type() {
                ChangeType::TableAdded => &mut summary.tables_added,
                ChangeType::TableRemoved => &mut summary.tables_removed,
                ChangeType::ColumnAdded => &mut summary.columns_added,
                ChangeType::ColumnRemoved => &mut summary.columns_removed,
                ChangeType::ColumnModified => &mut summary.columns_modified,
                ChangeType::RelationAdded => &mut summary.relations_added,
                ChangeType::RelationRemoved => &mut summary.relations_removed,
                ChangeType::RelationModified => &mut summary.relations_modified,
            };
            *counter += 1;
        }
        summary
    }

    /// Check if there are any schema changes
    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    /// Get total number of change records
    pub fn total_changes(&self) -> usize {
        self.tables_added
            + self.tables_removed
            + self.columns_added
            + self.columns_removed
            + self.columns_modified
            + self.relations_added
            + self.relations_removed
            + self.relations_modified
    }
}
