//! Command implementations.

pub mod completions;
pub mod desc;
pub mod ls;
pub mod query;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use slipway::Workspace;

/// Open and fully load the workspace containing `dir` (or the current
/// directory).
pub fn load_workspace(dir: &Option<PathBuf>) -> Result<Workspace> {
    let start = match dir {
        Some(d) => d.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let mut ws = Workspace::open(&start)?;
    ws.load()?;
    Ok(ws)
}
