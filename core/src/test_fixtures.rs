//! Shared schema and text fixtures for tests

use crate::schema::{ColumnDefinition, NormalizedSchema, Relation, TableDefinition};
use crate::text_diff::Attribution;

pub fn blog_schema() -> NormalizedSchema {
    NormalizedSchema::new()
        .with_table(
            "users",
            TableDefinition::new()
                .with_column("id", ColumnDefinition::new("int", false))
                .with_column("email", ColumnDefinition::new("varchar(255)", false))
                .with_column("nickname", ColumnDefinition::new("varchar(64)", true)),
        )
        .with_table(
            "posts",
            TableDefinition::new()
                .with_column("id", ColumnDefinition::new("int", false))
                .with_column("author_id", ColumnDefinition::new("int", false))
                .with_column("editor_id", ColumnDefinition::new("int", true))
                .with_column("body", ColumnDefinition::new("text", false))
                .with_relation(Relation::new("posts.author_id", "users.id").with_type("many-to-one")),
        )
        .with_table(
            "sessions",
            TableDefinition::new()
                .with_column("id", ColumnDefinition::new("uuid", false))
                .with_column("user_id", ColumnDefinition::new("int", false))
                .with_relation(Relation::new("sessions.user_id", "users.id").with_type("many-to-one")),
        )
}

/// `blog_schema` after one release: a table swapped, columns reshaped, a relation added
pub fn blog_schema_v2() -> NormalizedSchema {
    NormalizedSchema::new()
        .with_table(
            "users",
            TableDefinition::new()
                .with_column("id", ColumnDefinition::new("int", false))
                .with_column("email", ColumnDefinition::new("varchar(320)", false))
                .with_column("display_name", ColumnDefinition::new("varchar(128)", true)),
        )
        .with_table(
            "posts",
            TableDefinition::new()
                .with_column("id", ColumnDefinition::new("int", false))
                .with_column("author_id", ColumnDefinition::new("int", false))
                .with_column("editor_id", ColumnDefinition::new("int", true))
                .with_column("body", ColumnDefinition::new("text", true))
                .with_relation(Relation::new("posts.author_id", "users.id").with_type("many-to-one"))
                .with_relation(Relation::new("posts.editor_id", "users.id").with_type("many-to-one")),
        )
        .with_table(
            "tags",
            TableDefinition::new()
                .with_column("id", ColumnDefinition::new("int", false))
                .with_column("label", ColumnDefinition::new("varchar(32)", false)),
        )
}

pub fn editor() -> Attribution {
    Attribution::new("u-42", "Grace Hopper")
}

pub fn other_editor() -> Attribution {
    Attribution::new("u-7", "Alan Turing")
}
