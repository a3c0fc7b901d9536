//! Slipway CLI - resolve and query declarative build graphs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else if cli.quiet {
        EnvFilter::new("slipway=error")
    } else {
        EnvFilter::new("slipway=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Ls(args) => commands::ls::execute(&cli.dir, args),
        Commands::Desc(args) => commands::desc::execute(&cli.dir, args),
        Commands::Serve(args) => commands::serve::execute(&cli.dir, args),
        Commands::Query(args) => commands::query::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
