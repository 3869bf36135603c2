// CLI module for handling command-line interface

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fab-updater")]
#[command(about = "GitHub release updates for the Floating Action Button plugin")]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default fab-updater.toml
    Init,
    /// Check whether a newer release is available
    Check,
    /// Show the package details the host's dialog would display
    Info,
    /// Print config, cache contents, and a live lookup as JSON
    Debug,
    /// Forget the cached release lookup
    ClearCache,
    /// Download and install the available update
    Install,
}
