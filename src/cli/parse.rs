//! CLI parse: clap types for frametree. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Frametree CLI - structured program editing on frame trees
#[derive(Parser)]
#[command(name = "frametree")]
#[command(about = "Emit, import and check frame-structured programs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where frametree.toml is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the program text of a tree snapshot
    Emit {
        /// Tree snapshot (JSON)
        #[arg(long)]
        tree: PathBuf,
        /// Also print the line position map as JSON
        #[arg(long)]
        positions: bool,
    },
    /// Import a parsed syntax tree into frames and print the resulting program
    Import {
        /// Parsed syntax tree (JSON)
        #[arg(long)]
        cst: PathBuf,
        /// Existing tree snapshot to import into, at its cursor (default: empty program)
        #[arg(long)]
        tree: Option<PathBuf>,
        /// Write the resulting tree snapshot here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check the structural invariants of a tree snapshot
    Check {
        /// Tree snapshot (JSON)
        #[arg(long)]
        tree: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config,
}
