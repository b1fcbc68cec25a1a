use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "revdiff",
    about = "Field-level comparison of record revisions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two revisions stored as JSON records
    Compare(CompareArgs),
    /// Show the settings resolved for a configuration key
    Settings(SettingsArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    /// Left (older) revision
    pub left: PathBuf,
    /// Right (newer) revision
    pub right: PathBuf,
    /// TOML configuration snapshot
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Diff state to display
    #[arg(long, default_value = "raw")]
    pub state: String,
}

#[derive(Args)]
pub struct SettingsArgs {
    /// Field type or `entity.<entity_type>.<field_name>`
    pub key: String,
    /// TOML configuration snapshot
    #[arg(short, long)]
    pub config: PathBuf,
}
