//! Command implementations for verdiff CLI

use crate::cli::{Commands, ConfigCommand};
use crate::output::{JsonFormatter, PrettyPrinter};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use verdiff_core::config::{self, Config};
use verdiff_core::history::VersionHistory;
use verdiff_core::storage::{VersionInput, VersionStore};
use verdiff_core::{
    Attribution, IdentityResolver, LocalVersionStore, NormalizedSchema, SchemaComparator,
    TextDiffEngine,
};

/// Execute a command
pub fn execute_command(command: Commands, store_path: Option<&Path>) -> Result<()> {
    let config = config::get_config()?;

    match command {
        Commands::Schema { old, new, json } => schema_command(&old, &new, json),
        Commands::Text {
            old,
            new,
            user_id,
            username,
            stats,
            json,
        } => {
            let editor = resolve_editor(&config, user_id, username);
            text_command(&config, &old, &new, &editor, stats, json)
        }
        Commands::Commit {
            source,
            schema,
            text,
            user_id,
            username,
        } => {
            let author = resolve_editor(&config, user_id, username);
            commit_command(
                &config,
                store_path,
                &source,
                schema.as_deref(),
                text.as_deref(),
                author,
            )
        }
        Commands::Log { source, json } => log_command(&config, store_path, &source, json),
        Commands::Compare {
            source,
            from,
            to,
            json,
        } => compare_command(&config, store_path, &source, from, to, json),
        Commands::Replay { source, version } => replay_command(&config, store_path, &source, version),
        Commands::Config { command } => config_command(&config, command),
    }
}

/// The id defaults to the OS user; the name comes from the configured identities
fn resolve_editor(config: &Config, user_id: Option<String>, username: Option<String>) -> Attribution {
    let user_id = user_id.unwrap_or_else(whoami::username);
    match username {
        Some(name) => Attribution::new(user_id, name),
        None => config.identity_resolver().resolve(&user_id),
    }
}

fn open_history(config: &Config, store_path: Option<&Path>) -> VersionHistory<LocalVersionStore> {
    let path: PathBuf = store_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.store.path.clone());
    log::debug!("Using version store at {}", path.display());
    VersionHistory::new(LocalVersionStore::new(path), config.diff_options())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn schema_command(old: &Path, new: &Path, json: bool) -> Result<()> {
    let old_schema = NormalizedSchema::load(old)?;
    let new_schema = NormalizedSchema::load(new)?;
    let changes = SchemaComparator::compare(&old_schema, &new_schema);

    if json {
        println!("{}", JsonFormatter::format(&changes)?);
    } else {
        PrettyPrinter::print_schema_changes(
            &changes,
            &old.display().to_string(),
            &new.display().to_string(),
        );
    }
    Ok(())
}

fn text_command(
    config: &Config,
    old: &Path,
    new: &Path,
    editor: &Attribution,
    stats_only: bool,
    json: bool,
) -> Result<()> {
    let old_text = read_text(old)?;
    let new_text = read_text(new)?;
    let engine = TextDiffEngine::new(config.diff_options());
    let blocks = engine.diff(&old_text, &new_text, editor)?;

    match (stats_only, json) {
        (true, true) => println!(
            "{}",
            JsonFormatter::format(&verdiff_core::DiffStats::from_blocks(&blocks))?
        ),
        (true, false) => PrettyPrinter::print_stats(&verdiff_core::DiffStats::from_blocks(&blocks)),
        (false, true) => println!("{}", JsonFormatter::format_text_diff(&blocks)?),
        (false, false) => PrettyPrinter::print_diff_blocks(
            &blocks,
            &old.display().to_string(),
            &new.display().to_string(),
        ),
    }
    Ok(())
}

fn commit_command(
    config: &Config,
    store_path: Option<&Path>,
    source: &str,
    schema: Option<&Path>,
    text: Option<&Path>,
    author: Attribution,
) -> Result<()> {
    let history = open_history(config, store_path);
    let input = VersionInput {
        schema: schema.map(NormalizedSchema::load).transpose()?,
        text: text.map(read_text).transpose()?,
        author,
    };

    let outcome = history.commit(source, &input)?;
    println!(
        "✅ Stored '{}' v{} by {}",
        source, outcome.metadata.version, outcome.metadata.author.username
    );
    if let Some(blocks) = &outcome.diff_blocks {
        let stats = verdiff_core::DiffStats::from_blocks(blocks);
        println!(
            "   {} blocks vs v{}: +{} -{} ~{}",
            blocks.len(),
            outcome.metadata.parent_version.unwrap_or_default(),
            stats.added,
            stats.removed,
            stats.modified
        );
    }
    Ok(())
}

fn log_command(config: &Config, store_path: Option<&Path>, source: &str, json: bool) -> Result<()> {
    let history = open_history(config, store_path);
    let versions = history.store().list_versions(source)?;

    if json {
        println!("{}", JsonFormatter::format(&versions)?);
    } else {
        PrettyPrinter::print_version_log(source, &versions);
    }
    Ok(())
}

fn compare_command(
    config: &Config,
    store_path: Option<&Path>,
    source: &str,
    from: u64,
    to: u64,
    json: bool,
) -> Result<()> {
    let history = open_history(config, store_path);
    let comparison = history.compare(source, from, to)?;

    if json {
        println!("{}", JsonFormatter::format(&comparison)?);
    } else {
        PrettyPrinter::print_comparison(&comparison);
    }
    Ok(())
}

fn replay_command(config: &Config, store_path: Option<&Path>, source: &str, version: u64) -> Result<()> {
    let history = open_history(config, store_path);
    if history.replay(source, version)? {
        println!("✅ Stored diff of '{source}' v{version} reproduces identically");
        Ok(())
    } else {
        anyhow::bail!("Stored diff of '{source}' v{version} does not match a fresh recomputation")
    }
}

fn config_command(config: &Config, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let info = config::get_config_resolution_info()?;
            PrettyPrinter::print_config(config, &info);
        }
        ConfigCommand::MergeGap { gap } => {
            let mut updated = config.clone();
            updated.diff.merge_gap = gap;
            config::save_config(&updated)?;
            println!("✅ Merge gap set to {gap}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_editor_prefers_explicit_name() {
        let mut config = Config::default();
        config
            .identities
            .insert("u-1".to_string(), "Ada Lovelace".to_string());

        let explicit = resolve_editor(&config, Some("u-1".to_string()), Some("Ada".to_string()));
        assert_eq!(explicit, Attribution::new("u-1", "Ada"));

        let configured = resolve_editor(&config, Some("u-1".to_string()), None);
        assert_eq!(configured, Attribution::new("u-1", "Ada Lovelace"));

        let unknown = resolve_editor(&config, Some("u-9".to_string()), None);
        assert_eq!(unknown, Attribution::new("u-9", "u-9"));
    }

    #[test]
    fn test_commit_then_compare_through_commands() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = temp_dir.path().join("store");
        let old = temp_dir.path().join("v1.sql");
        let new = temp_dir.path().join("v2.sql");
        fs::write(&old, "CREATE TABLE users (\n  id INT\n);").unwrap();
        fs::write(&new, "CREATE TABLE users (\n  id INT,\n  email TEXT\n);").unwrap();

        let config = Config::default();
        let author = Attribution::new("u-1", "Ada");
        commit_command(&config, Some(store.as_path()), "app", None, Some(old.as_path()), author.clone()).unwrap();
        commit_command(&config, Some(store.as_path()), "app", None, Some(new.as_path()), author).unwrap();

        compare_command(&config, Some(store.as_path()), "app", 1, 2, true).unwrap();
        replay_command(&config, Some(store.as_path()), "app", 2).unwrap();
        assert!(compare_command(&config, Some(store.as_path()), "app", 1, 3, false).is_err());
    }
}
