//! Standalone web server binary
//!
//! Usage: cargo run -p pairs_web --bin pairs-web-server -- --port 8080

use clap::Parser;
use pairs_web::{init_logging, AppSettings, LogFormat, ServerConfig, WebServer};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pairs-web-server", version, about = "Serve the pairs card game in a browser")]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind to
    #[arg(long, short, default_value_t = 8080)]
    port: u16,
    /// Directory holding index.html, app.js and style.css. Embedded copies are used for missing files.
    #[arg(long, short = 'd')]
    static_dir: Option<PathBuf>,
    /// TOML settings file (mismatch_delay_ms, session_timeout_minutes)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log output format: pretty or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_format)?;

    let settings = match &args.config {
        Some(path) => AppSettings::from_toml_file(path)?,
        None => AppSettings::default(),
    };
    let static_dir = args.static_dir.unwrap_or_else(default_static_dir);

    let config = ServerConfig::new(args.host, args.port, static_dir).with_settings(settings);
    tracing::info!(
        host = %config.host(),
        port = config.port(),
        static_dir = %config.static_dir().display(),
        static_dir_exists = config.static_dir().exists(),
        mismatch_delay_ms = config.settings().mismatch_delay_ms,
        session_timeout_minutes = config.settings().session_timeout_minutes,
        "starting pairs web server"
    );

    let server = WebServer::new(config)?;
    let handle = server.start().await?;
    println!("Server running at http://{}  (Ctrl+C to stop)", handle.address());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down server");
    handle.shutdown().await?;
    Ok(())
}

fn default_static_dir() -> PathBuf {
    let candidates = [PathBuf::from("rust/web/static"), PathBuf::from("static")];
    candidates
        .iter()
        .find(|p| p.exists())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("static"))
}
