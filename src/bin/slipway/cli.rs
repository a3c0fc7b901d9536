//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Slipway - resolve and query declarative build graphs
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug/info)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every target in the workspace
    Ls(LsArgs),

    /// Describe a target and its transitive link data
    Desc(DescArgs),

    /// Load the workspace and serve queries over the local socket
    Serve(ServeArgs),

    /// Send a query to a running server
    Query(QueryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct LsArgs {
    /// Only list labels starting with this prefix (e.g. //base)
    pub prefix: Option<String>,
}

#[derive(Args)]
pub struct DescArgs {
    /// Target label, e.g. //app:app
    pub label: String,

    /// Restrict output to one section (libs, lib_dirs, deps, ...)
    pub section: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Serve on this socket path instead of the well-known default
    #[arg(long)]
    pub socket: Option<PathBuf>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Raw query arguments; the first is the subcommand (currently `desc`)
    #[arg(required = true, trailing_var_arg = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
