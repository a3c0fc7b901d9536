//! The query server.
//!
//! Owns one loaded workspace, one aggregator, and a listening unix-domain
//! socket. Connections are served one at a time to completion; per-
//! connection failures are reported and never take the server down.

use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd};
use std::path::{Path, PathBuf};

use nix::sys::socket::{self, AddressFamily, Backlog, SockFlag, SockType, UnixAddr};
use thiserror::Error;

use crate::core::workspace::Workspace;
use crate::ops::desc::run_desc;
use crate::query::protocol::{self, Request};
use crate::query::redirect::StdioRedirect;
use crate::resolved::ResolvedTargetData;

/// Where clients find the server. The file is not unlinked on startup or
/// shutdown: a stale path makes bind fail loudly, which doubles as
/// stale-server detection, and the operator removes it by hand.
pub const SERVER_SOCKET_PATH: &str = "/tmp/slipway-query.sock";

/// Pending-connection queue length.
pub const SERVER_BACKLOG: i32 = 10;

/// Fatal setup errors. Everything after listen is per-connection and
/// reported instead.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to create server socket: {0}")]
    SocketCreate(#[source] nix::Error),

    #[error("failed to bind server socket to path {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("failed to listen with server socket at path {path}: {source}")]
    Listen {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },
}

/// A bound, listening query server.
#[derive(Debug)]
pub struct QueryServer {
    workspace: Workspace,
    socket: OwnedFd,
    path: PathBuf,
}

impl QueryServer {
    /// Bind at the fixed well-known path.
    pub fn bind(workspace: Workspace) -> Result<Self, ServerError> {
        Self::bind_at(workspace, Path::new(SERVER_SOCKET_PATH))
    }

    /// Bind at an explicit path (tests use a scratch directory).
    pub fn bind_at(workspace: Workspace, path: &Path) -> Result<Self, ServerError> {
        let socket = socket::socket(
            AddressFamily::Unix,
            SockType::Stream,
            SockFlag::empty(),
            None,
        )
        .map_err(ServerError::SocketCreate)?;

        let addr = UnixAddr::new(path).map_err(|source| ServerError::Bind {
            path: path.to_path_buf(),
            source,
        })?;
        socket::bind(socket.as_raw_fd(), &addr).map_err(|source| ServerError::Bind {
            path: path.to_path_buf(),
            source,
        })?;

        let backlog = Backlog::new(SERVER_BACKLOG).map_err(|source| ServerError::Listen {
            path: path.to_path_buf(),
            source,
        })?;
        socket::listen(&socket, backlog).map_err(|source| ServerError::Listen {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(QueryServer {
            workspace,
            socket,
            path: path.to_path_buf(),
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn socket_path(&self) -> &Path {
        &self.path
    }

    /// Accept and serve connections forever. The aggregator is shared
    /// across connections, so repeated queries hit its memo cache.
    pub fn serve(&self) -> ! {
        println!("Server listening...");
        let data = ResolvedTargetData::new(self.workspace.graph());
        loop {
            self.serve_next(&data);
        }
    }

    /// Accept one connection, handle it to completion, close it.
    pub fn serve_next<'g>(&'g self, data: &ResolvedTargetData<'g>) {
        let client = match socket::accept(self.socket.as_raw_fd()) {
            Ok(fd) => unsafe { OwnedFd::from_raw_fd(fd) },
            Err(e) => {
                eprintln!("error: failed to accept client connection: {e}");
                return;
            }
        };

        self.handle_client(&client, data);

        if let Err(e) = nix::unistd::close(client.into_raw_fd()) {
            // Report close failures but don't exit the server.
            eprintln!("error: failed to close client connection: {e}");
        }
    }

    fn handle_client<'g>(&'g self, client: &OwnedFd, data: &ResolvedTargetData<'g>) {
        // Failures before the redirect is installed go to the server's
        // own stderr.
        let request = match protocol::recv_request(client.as_raw_fd()) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("error: {e}");
                return;
            }
        };

        let redirect = match StdioRedirect::new(
            request.stdout_fd.as_raw_fd(),
            request.stderr_fd.as_raw_fd(),
        ) {
            Ok(redirect) => redirect,
            Err(e) => {
                eprintln!("error: failed to redirect streams: {e}");
                return;
            }
        };

        self.dispatch(&request, data);

        // Restore the server's streams, then drop the client fds.
        drop(redirect);
        drop(request);
    }

    /// Run the requested subcommand. The streams are already the
    /// client's, so errors are reported straight to its stderr.
    fn dispatch<'g>(&'g self, request: &Request, data: &ResolvedTargetData<'g>) {
        match request.args[0].as_str() {
            "desc" => {
                if let Err(e) = run_desc(&request.args[1..], &self.workspace, data) {
                    eprintln!("error: failed to run desc: {e:#}");
                }
            }
            other => {
                eprintln!("error: unsupported query command: {other}");
            }
        }
    }
}
