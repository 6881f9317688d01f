use clap::Parser;
use line_client::{Client, DEFAULT_HOST, DEFAULT_PORT};
use log::{debug, error, info};
use std::io;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive TCP line client", long_about = None)]
struct Args {
    /// Host to connect to
    #[arg(default_value = DEFAULT_HOST)]
    host: String,
    /// Port to connect to
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut client = Client::new(args.host, args.port);
    info!("Connecting to {}:{}", client.host(), client.port());
    if let Err(e) = client.connect() {
        debug!("{}", e);
    }
    if let Err(e) = client.run_loop(io::stdin().lock()) {
        error!("Session ended: {}", e);
    }
}
