//! An interactive TCP line client and the small key/value server it talks to.
//!
//! The client sends each line typed by the user as raw bytes and prints
//! whatever comes back in a single read. The server understands
//! `SET key value`, `GET key`, `REMOVE key` and `PRINT`.

pub mod client;
pub mod command;
pub mod error;
pub mod server;
pub mod store;

pub use client::Client;
pub use command::Command;
pub use error::{ClientError, ServerError};
pub use server::Server;
pub use store::KeyValueStore;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3490;

/// Upper bound of a single client read.
pub const RECV_BUF_SIZE: usize = 100;

/// Upper bound of a single server read. One byte short of the client's.
pub const SERVER_BUF_SIZE: usize = 99;

pub const DEFAULT_STORE_PATH: &str = "store.txt";

/// Typed by the user to end a session; also ends the server side of it.
pub const QUIT_COMMAND: &str = "quit";
