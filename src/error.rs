use std::io;

use thiserror::Error;

/// Errors returned by [`Client`](crate::Client) operations.
///
/// Every variant has already been reported on the client's output by the
/// time it is returned; callers decide whether to keep going.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The TCP connection could not be established.
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    /// Writing to the socket failed. The connection is left open.
    #[error("error sending message: {0}")]
    Send(#[source] io::Error),
    /// Reading from the socket failed.
    #[error("error receiving message: {0}")]
    Receive(#[source] io::Error),
    /// The operation needs a connection and there is none.
    #[error("no connection to server")]
    NotConnected,
    /// Reading a line from the interactive input failed.
    #[error("error reading input: {0}")]
    Input(#[source] io::Error),
}

/// Errors returned by the key/value [`Server`](crate::Server).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
