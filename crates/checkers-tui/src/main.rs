use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod client;
mod tui;

#[derive(Parser)]
#[command(name = "checkers")]
#[command(about = "Join an online checkers game", long_about = None)]
struct Cli {
    /// WebSocket server URL
    #[arg(short, long, default_value = "ws://127.0.0.1:3030")]
    server: String,

    /// Game ID to join (share it with your opponent)
    #[arg(short, long)]
    game: String,

    /// Write diagnostic logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Log to a file so tracing output never lands on the TUI.
fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file
        && let Err(e) = init_logging(path)
    {
        eprintln!("Cannot open log file {}: {}", path.display(), e);
        return;
    }

    let url = match checkers_core::protocol::game_url(&cli.server, &cli.game) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    println!("Joining game '{}' on {}...", cli.game, cli.server);

    if let Err(e) = client::start_client(&url).await {
        eprintln!("Error: {}", e);
    }
}
