//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bundler-compose - run commands with extra gems on top of a locked bundle
///
/// Composes a gemfile from the current Gemfile.lock plus the requested gems
/// or gemfiles, caches it next to the project, and runs the command through
/// `bundle exec`.
#[derive(Parser, Debug)]
#[command(name = "bundler-compose")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress status output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUNDLER_COMPOSE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose extra gems and run a command
    #[command(visible_alias = "gem")]
    Gems(GemsArgs),

    /// Compose extra gemfiles and run a command
    Gemfiles(GemfilesArgs),

    /// Manage composed gemfiles
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the gems command
#[derive(Parser, Debug)]
pub struct GemsArgs {
    /// Gems to add, as NAME or NAME:REQUIREMENT (e.g. rack-obama:1)
    #[arg(required = true, value_name = "GEM")]
    pub gems: Vec<String>,

    /// Executable to run (defaults to the first gem's name)
    #[arg(short, long)]
    pub exec: Option<String>,

    /// Recompose even if the cached gemfile is fresh
    #[arg(long)]
    pub refresh: bool,

    /// Arguments passed to the executable
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for the gemfiles command
#[derive(Parser, Debug)]
pub struct GemfilesArgs {
    /// Gemfiles to evaluate on top of the base gemfile
    #[arg(required = true, value_name = "GEMFILE")]
    pub gemfiles: Vec<PathBuf>,

    /// Executable to run
    #[arg(short, long, required = true)]
    pub exec: String,

    /// Recompose even if the cached gemfile is fresh
    #[arg(long)]
    pub refresh: bool,

    /// Arguments passed to the executable
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., exec.bundle_command)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List composed gemfiles for the current project
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove composed gemfiles
    #[command(group(clap::ArgGroup::new("target").required(true).args(["slug", "all"])))]
    Clear {
        /// Entry to remove (as shown by `cache list`)
        slug: Option<String>,

        /// Remove every entry
        #[arg(long)]
        all: bool,
    },
}
