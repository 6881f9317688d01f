use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, error, info, warn};

use crate::command;
use crate::error::ServerError;
use crate::store::KeyValueStore;
use crate::{QUIT_COMMAND, SERVER_BUF_SIZE};

type SharedStore = Arc<Mutex<KeyValueStore>>;

/// Serves key/value commands over TCP, one thread per client.
pub struct Server {
    listener: TcpListener,
    store: SharedStore,
}

impl Server {
    pub fn bind(
        addr: impl ToSocketAddrs + ToString,
        store: KeyValueStore,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&addr).map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self {
            listener,
            store: Arc::new(Mutex::new(store)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts clients until the listener fails.
    /// If `single_shot` is true, handles one client inline and returns.
    pub fn run(&self, single_shot: bool) -> Result<(), ServerError> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let store = Arc::clone(&self.store);
                    if single_shot {
                        handle_client(stream, &store);
                        break;
                    }
                    thread::spawn(move || handle_client(stream, &store));
                }
                Err(err) => {
                    error!("Error accepting connection: {}", err);
                    if single_shot {
                        return Err(err.into());
                    }
                }
            }
        }
        Ok(())
    }
}

fn handle_client(mut stream: TcpStream, store: &SharedStore) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown peer".to_string());
    info!("Server got connection from {}", peer);

    let mut buffer = [0; SERVER_BUF_SIZE];
    loop {
        let bytes_read = match stream.read(&mut buffer) {
            Ok(0) => {
                info!("Client {} disconnected", peer);
                break;
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Error receiving message from {}: {}", peer, e);
                break;
            }
        };

        let message = String::from_utf8_lossy(&buffer[..bytes_read]);
        debug!("Received from {}: {}", peer, message);
        if message == QUIT_COMMAND {
            info!("Client {} requested quit", peer);
            break;
        }

        let response = match store.lock() {
            Ok(mut store) => command::execute(&mut store, &message),
            Err(poisoned) => command::execute(&mut poisoned.into_inner(), &message),
        };
        if let Err(e) = stream.write_all(response.as_bytes()) {
            warn!("Error sending message to {}: {}", peer, e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_server_communication() {
        let path = std::env::temp_dir()
            .join(format!("line-client-server-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let server = Server::bind("127.0.0.1:0", KeyValueStore::open(&path)).unwrap();
        let addr = server.local_addr().unwrap();

        // Run server in a separate thread in single-shot mode.
        let server_thread = thread::spawn(move || {
            server.run(true).unwrap();
        });

        let mut stream = TcpStream::connect(addr).unwrap();
        let mut buffer = [0; 128];

        stream.write_all(b"SET greeting hi").unwrap();
        let n = stream.read(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"Added greeting and value hi\n");

        stream.write_all(b"GET greeting").unwrap();
        let n = stream.read(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"hi");

        stream.write_all(b"quit").unwrap();
        // The server hangs up without replying.
        let n = stream.read(&mut buffer).unwrap();
        assert_eq!(n, 0);
        drop(stream);

        server_thread.join().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let path = std::env::temp_dir().join("line-client-unused-store.txt");
        let result = Server::bind(addr, KeyValueStore::open(path));
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
