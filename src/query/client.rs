//! Client side of the query protocol.
//!
//! Connects to a running server, hands over two descriptors for the
//! response to land on, sends the argument payload, and waits for the
//! server to close the connection.

use std::io::Read;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::Path;

use anyhow::{Context, Result};

use crate::query::protocol;

/// Send `args` to the server at `socket_path`, directing its output to
/// `stdout_fd` / `stderr_fd` (normally the caller's own streams).
/// Returns once the server has finished and closed the connection.
pub fn run_query(
    socket_path: &Path,
    args: &[String],
    stdout_fd: RawFd,
    stderr_fd: RawFd,
) -> Result<()> {
    let mut stream = UnixStream::connect(socket_path).with_context(|| {
        format!(
            "failed to connect to query server at {}\n\
             help: start one with `slipway serve`",
            socket_path.display()
        )
    })?;

    protocol::send_request(stream.as_raw_fd(), args, stdout_fd, stderr_fd)?;

    // The server writes directly to the descriptors we passed; the only
    // signal on the socket itself is the close.
    let mut sink = [0u8; 64];
    while stream
        .read(&mut sink)
        .context("failed waiting for server to finish")?
        > 0
    {}

    Ok(())
}
