//! Scoped redirection of the process-wide stdout/stderr.
//!
//! While a request is being served, the server's standard streams point
//! at descriptors supplied by the client, so the subcommand's normal
//! output lands on the client's terminal. The previous descriptors are
//! restored when the guard drops, on every exit path including panics.

use std::io::Write;
use std::os::fd::RawFd;

use nix::libc;
use nix::unistd;

/// RAII guard: while alive, fds 1 and 2 are the client's.
pub struct StdioRedirect {
    saved_stdout: RawFd,
    saved_stderr: RawFd,
}

impl StdioRedirect {
    /// Duplicate the current fds 1/2 to backups, then point them at
    /// `stdout_fd` / `stderr_fd`.
    pub fn new(stdout_fd: RawFd, stderr_fd: RawFd) -> nix::Result<Self> {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        let saved_stdout = unistd::dup(libc::STDOUT_FILENO)?;
        let saved_stderr = match unistd::dup(libc::STDERR_FILENO) {
            Ok(fd) => fd,
            Err(e) => {
                let _ = unistd::close(saved_stdout);
                return Err(e);
            }
        };

        unistd::dup2(stdout_fd, libc::STDOUT_FILENO)?;
        unistd::dup2(stderr_fd, libc::STDERR_FILENO)?;

        Ok(StdioRedirect { saved_stdout, saved_stderr })
    }
}

impl Drop for StdioRedirect {
    fn drop(&mut self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        let _ = unistd::dup2(self.saved_stdout, libc::STDOUT_FILENO);
        let _ = unistd::dup2(self.saved_stderr, libc::STDERR_FILENO);
        let _ = unistd::close(self.saved_stdout);
        let _ = unistd::close(self.saved_stderr);
    }
}
