//! The query socket: server, client, wire protocol, and the scoped
//! stream redirection the server installs per connection.

pub mod client;
pub mod protocol;
pub mod redirect;
pub mod server;

pub use client::run_query;
pub use protocol::{ProtocolError, Request, MAX_PAYLOAD};
pub use redirect::StdioRedirect;
pub use server::{QueryServer, ServerError, SERVER_BACKLOG, SERVER_SOCKET_PATH};
