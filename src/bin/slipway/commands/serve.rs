//! `slipway serve` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::ServeArgs;
use crate::commands::load_workspace;
use slipway::QueryServer;

pub fn execute(dir: &Option<PathBuf>, args: ServeArgs) -> Result<()> {
    println!("Loading build files...");
    let ws = load_workspace(dir)?;

    let server = match args.socket {
        Some(path) => QueryServer::bind_at(ws, &path)?,
        None => QueryServer::bind(ws)?,
    };
    server.serve()
}
