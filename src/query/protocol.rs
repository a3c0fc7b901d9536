//! Wire format of the query socket.
//!
//! A request is a single message: an 8-byte native-endian length followed
//! by up to [`MAX_PAYLOAD`] bytes of NUL-delimited argument strings, with
//! exactly two file descriptors (the client's stdout and stderr, in that
//! order) attached as one SCM_RIGHTS record. The server sends no framed
//! reply; closing the connection signals completion.

use std::io::{IoSlice, IoSliceMut};
use std::os::fd::{FromRawFd, OwnedFd, RawFd};

use nix::sys::socket::{self, ControlMessage, ControlMessageOwned, MsgFlags, UnixAddr};
use thiserror::Error;

/// Maximum argument payload, excluding the length prefix.
pub const MAX_PAYLOAD: usize = 4096;

/// Size of the length prefix.
pub const HEADER_LEN: usize = std::mem::size_of::<u64>();

/// Errors while receiving or validating one request.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to receive args from client: {0}")]
    RecvFailed(#[source] nix::Error),

    #[error("bad cmsg header: {reason}")]
    BadCmsg { reason: &'static str },

    #[error("request length {len} is inconsistent with {received} received bytes")]
    LengthMismatch { len: usize, received: usize },

    #[error("request carried no arguments")]
    EmptyArgs,

    #[error("request payload exceeds {MAX_PAYLOAD} bytes")]
    PayloadTooLarge,

    #[error("failed to send request: {0}")]
    SendFailed(#[source] nix::Error),
}

/// One decoded request: the argument vector plus the client's streams.
/// The descriptors close when this drops.
pub struct Request {
    pub args: Vec<String>,
    pub stdout_fd: OwnedFd,
    pub stderr_fd: OwnedFd,
}

/// Receive and validate a single request from a connected socket.
pub fn recv_request(fd: RawFd) -> Result<Request, ProtocolError> {
    let mut buf = [0u8; HEADER_LEN + MAX_PAYLOAD];
    let mut cmsg_buf = nix::cmsg_space!([RawFd; 2]);

    let (received, raw_fds) = {
        let mut iov = [IoSliceMut::new(&mut buf)];
        let msg = socket::recvmsg::<UnixAddr>(
            fd,
            &mut iov,
            Some(&mut cmsg_buf),
            MsgFlags::empty(),
        )
        .map_err(ProtocolError::RecvFailed)?;

        let mut raw_fds: Vec<RawFd> = Vec::new();
        let mut rights_records = 0usize;
        for cmsg in msg.cmsgs().map_err(|_| ProtocolError::BadCmsg {
            reason: "control data truncated",
        })? {
            match cmsg {
                ControlMessageOwned::ScmRights(fds) => {
                    rights_records += 1;
                    raw_fds.extend(fds);
                }
                _ => {
                    return Err(ProtocolError::BadCmsg {
                        reason: "unexpected control message type",
                    });
                }
            }
        }
        if rights_records != 1 {
            // Close anything we were handed before failing.
            for raw in raw_fds {
                drop(unsafe { OwnedFd::from_raw_fd(raw) });
            }
            return Err(ProtocolError::BadCmsg {
                reason: "expected exactly one rights record",
            });
        }
        (msg.bytes, raw_fds)
    };

    // Take ownership immediately so every error path below closes them.
    let mut owned = raw_fds
        .into_iter()
        .map(|raw| unsafe { OwnedFd::from_raw_fd(raw) });
    let (stdout_fd, stderr_fd) = match (owned.next(), owned.next(), owned.next()) {
        (Some(out), Some(err), None) => (out, err),
        _ => {
            return Err(ProtocolError::BadCmsg {
                reason: "expected exactly two descriptors (stdout, stderr)",
            });
        }
    };

    if received < HEADER_LEN {
        return Err(ProtocolError::LengthMismatch { len: 0, received });
    }
    let len = u64::from_ne_bytes(buf[..HEADER_LEN].try_into().unwrap()) as usize;
    // The declared length must fit both the cap and what actually arrived.
    if len > MAX_PAYLOAD || HEADER_LEN + len > received {
        return Err(ProtocolError::LengthMismatch { len, received });
    }

    let args = split_args(&buf[HEADER_LEN..HEADER_LEN + len]);
    if args.is_empty() {
        return Err(ProtocolError::EmptyArgs);
    }

    Ok(Request { args, stdout_fd, stderr_fd })
}

/// Send one request over a connected socket, attaching `stdout_fd` and
/// `stderr_fd` as the rights record.
pub fn send_request(
    socket_fd: RawFd,
    args: &[String],
    stdout_fd: RawFd,
    stderr_fd: RawFd,
) -> Result<(), ProtocolError> {
    let payload = encode_args(args);
    if payload.len() > MAX_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge);
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&(payload.len() as u64).to_ne_bytes());
    buf.extend_from_slice(&payload);

    let iov = [IoSlice::new(&buf)];
    let fds = [stdout_fd, stderr_fd];
    let cmsgs = [ControlMessage::ScmRights(&fds)];
    socket::sendmsg::<UnixAddr>(socket_fd, &iov, &cmsgs, MsgFlags::empty(), None)
        .map_err(ProtocolError::SendFailed)?;
    Ok(())
}

/// NUL-terminate each argument.
pub fn encode_args(args: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for arg in args {
        out.extend_from_slice(arg.as_bytes());
        out.push(0);
    }
    out
}

/// Split a payload on NUL bytes. An argument is only complete once its
/// terminator arrives; trailing bytes without one are dropped.
pub fn split_args(payload: &[u8]) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = Vec::new();
    for &byte in payload {
        if byte == 0 {
            args.push(String::from_utf8_lossy(&current).into_owned());
            current.clear();
        } else {
            current.push(byte);
        }
    }
    args
}
