use clap::Parser;
use line_client::{DEFAULT_PORT, DEFAULT_STORE_PATH, KeyValueStore, Server};
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about = "Key/value server for the line client", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// File the store is loaded from and saved to
    #[arg(long, value_name = "PATH", default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let store = KeyValueStore::open(&args.store);
    info!("Loaded {} entries from {:?}", store.len(), store.path());

    let server = match Server::bind(format!("0.0.0.0:{}", args.port), store) {
        Ok(server) => server,
        Err(e) => {
            error!("Server error: {}", e);
            process::exit(1);
        }
    };
    println!("Server listening on port {}", args.port);

    if let Err(e) = server.run(false) {
        error!("Server error: {}", e);
    }
}
