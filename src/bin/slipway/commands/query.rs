//! `slipway query` command

use std::path::Path;

use anyhow::Result;
use nix::libc;

use crate::cli::QueryArgs;
use slipway::query::{run_query, SERVER_SOCKET_PATH};

pub fn execute(args: QueryArgs) -> Result<()> {
    // The server answers on our own streams; we just hand them over.
    run_query(
        Path::new(SERVER_SOCKET_PATH),
        &args.args,
        libc::STDOUT_FILENO,
        libc::STDERR_FILENO,
    )
}
