use clap::{Args, Parser, Subcommand};

use crate::model::Field;

#[derive(Parser)]
#[command(name = "qt", about = concat!("[#] qtag v", env!("CARGO_PKG_VERSION"), " - tag question banks against a subject taxonomy"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a qtag data directory here
    Init(InitArgs),
    /// Load a taxonomy file, or show the loaded taxonomy
    Taxonomy(TaxonomyArgs),
    /// Import a questions CSV into the active workspace
    Import(ImportArgs),
    /// List questions and their tag mappings
    List,
    /// Show one question in detail
    Show(ShowArgs),
    /// Edit tag mappings
    Tag(TagCmd),
    /// Show tagging progress
    Stats,
    /// Report mappings that reference taxonomy entries that no longer exist
    Check,
    /// Export tagged questions as CSV
    Export(ExportArgs),
    /// Manage workspaces
    Ws(WsCmd),
    /// Write the active workspace's snapshot to a backup file
    Backup(BackupArgs),
    /// Restore the active workspace from a backup file
    Restore(RestoreArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Reinitialize even if a qtag/ directory already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct TaxonomyArgs {
    /// CSV file with Subject, Topic, Subtopic columns (omit to show current)
    pub file: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file with Question and Answer columns (matched case-insensitively)
    pub file: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Question index
    pub index: usize,
}

#[derive(Args)]
pub struct TagCmd {
    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Set one field of a mapping (changing a parent clears its children)
    Set {
        /// Question index
        index: usize,
        /// Mapping position on that question
        pos: usize,
        /// Which field: subject, topic, or subtopic
        field: Field,
        /// The taxonomy value to select
        value: String,
    },
    /// Unset one field of a mapping (clears its children too)
    Unset {
        index: usize,
        pos: usize,
        field: Field,
    },
    /// Append an empty mapping to a question
    Add {
        index: usize,
    },
    /// Remove a mapping (a question always keeps at least one)
    Rm {
        index: usize,
        pos: usize,
    },
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output CSV path
    pub out: String,
}

#[derive(Args)]
pub struct WsCmd {
    #[command(subcommand)]
    pub action: WsAction,
}

#[derive(Subcommand)]
pub enum WsAction {
    /// Create and register a new workspace
    New {
        name: String,
    },
    /// List registered workspaces
    List,
    /// Switch the active workspace (saves the outgoing one first)
    Use {
        name: String,
    },
    /// Delete a workspace and its snapshot
    Clear {
        name: String,
    },
}

#[derive(Args)]
pub struct BackupArgs {
    /// Destination file for the snapshot JSON
    pub file: String,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Snapshot JSON file to restore from
    pub file: String,
}
