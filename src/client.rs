use std::io::{self, BufRead, ErrorKind, Read, Stdout, Write};
use std::net::{SocketAddr, TcpStream};

use log::{debug, info, warn};

use crate::error::ClientError;
use crate::{QUIT_COMMAND, RECV_BUF_SIZE};

/// An interactive line client owning at most one TCP connection.
///
/// Status and response lines go to `out`, standard output unless built
/// with [`Client::with_output`]. Diagnostics go through `log`.
pub struct Client<W: Write = Stdout> {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    out: W,
}

impl Client<Stdout> {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_output(host, port, io::stdout())
    }
}

impl<W: Write> Client<W> {
    pub fn with_output(host: impl Into<String>, port: u16, out: W) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
            out,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Everything reported so far, when the sink keeps it (e.g. `Vec<u8>`).
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Opens a connection to `host:port`.
    ///
    /// An existing connection is closed first. On failure the error is
    /// reported and the client is left unconnected.
    pub fn connect(&mut self) -> Result<SocketAddr, ClientError> {
        if self.stream.is_some() {
            debug!("already connected to {}:{}, reconnecting", self.host, self.port);
            self.stop();
        }

        let connected = TcpStream::connect((self.host.as_str(), self.port))
            .and_then(|stream| stream.peer_addr().map(|peer| (stream, peer)));
        match connected {
            Ok((stream, peer)) => {
                info!("connected to {}", peer);
                self.stream = Some(stream);
                let line = format!("Connected to {} on port {}", self.host(), self.port());
                self.report(&line);
                Ok(peer)
            }
            Err(e) => {
                self.report(&format!("Connection failed: {}", e));
                Err(ClientError::Connect {
                    addr: format!("{}:{}", self.host, self.port),
                    source: e,
                })
            }
        }
    }

    /// Writes every byte of `message` to the server.
    ///
    /// A write error does not drop the connection.
    pub fn send(&mut self, message: &str) -> Result<(), ClientError> {
        let Some(stream) = self.stream.as_mut() else {
            self.report("No connection to server.");
            return Err(ClientError::NotConnected);
        };

        match stream.write_all(message.as_bytes()) {
            Ok(()) => {
                debug!("sent {} bytes", message.len());
                Ok(())
            }
            Err(e) => {
                self.report(&format!("Error sending message: {}", e));
                Err(ClientError::Send(e))
            }
        }
    }

    /// Performs a single read of at most [`RECV_BUF_SIZE`] bytes.
    ///
    /// An empty string means the peer closed the connection.
    pub fn receive(&mut self) -> Result<String, ClientError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ClientError::NotConnected);
        };

        let mut buffer = [0; RECV_BUF_SIZE];
        let read = loop {
            match stream.read(&mut buffer) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        match read {
            Ok(bytes_read) => {
                debug!("received {} bytes", bytes_read);
                Ok(String::from_utf8_lossy(&buffer[..bytes_read]).into_owned())
            }
            Err(e) => {
                self.report(&format!("Error receiving message: {}", e));
                Err(ClientError::Receive(e))
            }
        }
    }

    /// Drives the prompt/send/receive loop until the user quits, the
    /// server stops answering, or `input` runs dry.
    ///
    /// The connection is closed on every way out of the loop.
    pub fn run_loop<R: BufRead>(&mut self, mut input: R) -> Result<(), ClientError> {
        if self.stream.is_none() {
            self.report("Cannot start main loop; no server connection.");
            return Err(ClientError::NotConnected);
        }

        let session = Session(self);
        session.0.converse(&mut input)
    }

    /// Closes the connection if there is one. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("connection to {}:{} closed", self.host, self.port);
            self.report("Connection closed.");
        }
    }

    fn converse<R: BufRead>(&mut self, input: &mut R) -> Result<(), ClientError> {
        let mut line = String::new();
        loop {
            self.prompt();
            line.clear();
            if input.read_line(&mut line).map_err(ClientError::Input)? == 0 {
                debug!("input closed");
                return Ok(());
            }

            let message = strip_newline(&line);
            if message.eq_ignore_ascii_case(QUIT_COMMAND) {
                if let Err(e) = self.send(QUIT_COMMAND) {
                    debug!("quit not delivered: {}", e);
                }
                self.report("Quitting...");
                return Ok(());
            }

            if let Err(e) = self.send(message) {
                debug!("send failed, still waiting for a reply: {}", e);
            }
            match self.receive() {
                Ok(response) if !response.is_empty() => {
                    self.report(&format!("Response: {}", response));
                }
                _ => {
                    self.report("No response from server or connection closed.");
                    return Ok(());
                }
            }
        }
    }

    fn prompt(&mut self) {
        let written = self
            .out
            .write_all(b"Enter message: ")
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!("failed to write prompt: {}", e);
        }
    }

    fn report(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!("failed to write to output: {}", e);
        }
    }
}

/// Stops the client when the interactive loop is left, however it is left.
struct Session<'a, W: Write>(&'a mut Client<W>);

impl<W: Write> Drop for Session<'_, W> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

fn strip_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
