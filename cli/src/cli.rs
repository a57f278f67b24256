//! Command-line interface for verdiff

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "verdiff")]
#[command(about = "Structural and textual diffs between database schema versions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override version store location
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two normalized schema JSON files
    Schema {
        /// Older schema version
        old: PathBuf,

        /// Newer schema version
        new: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diff two raw-text versions of a schema definition
    Text {
        /// Older text version
        old: PathBuf,

        /// Newer text version
        new: PathBuf,

        /// Id of the user who produced the newer version (defaults to the current OS user)
        #[arg(long)]
        user_id: Option<String>,

        /// Display name of that user (defaults to the configured identity for the id)
        #[arg(long)]
        username: Option<String>,

        /// Only print line statistics
        #[arg(long)]
        stats: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store a new version of a source in the version store
    Commit {
        /// Source name
        source: String,

        /// Normalized schema JSON for this version
        #[arg(long, required_unless_present = "text")]
        schema: Option<PathBuf>,

        /// Raw schema text for this version
        #[arg(long, required_unless_present = "schema")]
        text: Option<PathBuf>,

        /// Id of the author (defaults to the current OS user)
        #[arg(long)]
        user_id: Option<String>,

        /// Display name of the author
        #[arg(long)]
        username: Option<String>,
    },

    /// List stored versions of a source
    Log {
        /// Source name
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two stored versions
    Compare {
        /// Source name
        source: String,

        /// Older version number
        from: u64,

        /// Newer version number
        to: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute a stored diff and verify it is unchanged
    Replay {
        /// Source name
        source: String,

        /// Version whose diff should be replayed
        version: u64,
    },

    /// Inspect verdiff settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set the merge gap in the global configuration
    MergeGap {
        /// Maximum unchanged lines between blocks that get merged
        gap: usize,
    },
}
