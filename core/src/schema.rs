//! Normalized schema data model shared by the structural comparator and the version store

use crate::error::{Result, VerdiffError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table name -> table definition, iterated in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSchema {
    pub tables: IndexMap<String, TableDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(default)]
    pub columns: IndexMap<String, ColumnDefinition>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Column definition. Only `data_type` and `nullable` take part in change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

/// Relation between two `table.column` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<String>,
}

impl NormalizedSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table insertion, keeps insertion order
    pub fn with_table(mut self, name: impl Into<String>, table: TableDefinition) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Parse and validate a schema from its JSON representation
    pub fn from_json_str(content: &str) -> Result<Self> {
        let schema: NormalizedSchema = serde_json::from_str(content)
            .map_err(|e| VerdiffError::invalid_schema(format!("malformed schema JSON: {e}")))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load a schema from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|e| match e {
            VerdiffError::InvalidSchema(msg) => {
                VerdiffError::invalid_schema(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject shapes the comparator cannot report on meaningfully
    pub fn validate(&self) -> Result<()> {
        for (table_name, table) in &self.tables {
            if table_name.trim().is_empty() {
                return Err(VerdiffError::invalid_schema("table name must not be empty"));
            }
            for (column_name, column) in &table.columns {
                if column_name.trim().is_empty() {
                    return Err(VerdiffError::invalid_schema(format!(
                        "table '{table_name}' has a column with an empty name"
                    )));
                }
                if column.data_type.trim().is_empty() {
                    return Err(VerdiffError::invalid_schema(format!(
                        "column '{table_name}.{column_name}' has an empty type"
                    )));
                }
            }
            for relation in &table.relations {
                for endpoint in [&relation.from, &relation.to] {
                    if !is_qualified_column(endpoint) {
                        return Err(VerdiffError::invalid_schema(format!(
                            "relation endpoint '{endpoint}' in table '{table_name}' is not of the form table.column"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn is_qualified_column(endpoint: &str) -> bool {
    match endpoint.split_once('.') {
        Some((table, column)) => !table.is_empty() && !column.is_empty(),
        None => false,
    }
}

impl TableDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, column: ColumnDefinition) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }
}

impl ColumnDefinition {
    pub fn new(data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            data_type: data_type.into(),
            nullable,
            default: None,
            primary: false,
            unique: false,
            foreign_key: None,
        }
    }
}

impl Relation {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: None,
        }
    }

    pub fn with_type(mut self, relation_type: impl Into<String>) -> Self {
        self.relation_type = Some(relation_type.into());
        self
    }

    /// Identity key used when diffing relations, rendered `from->to`
    pub fn key(&self) -> String {
        format!("{}->{}", self.from, self.to)
    }
}
