use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use subcast::config::Config;
use subcast::media::{check_ffmpeg, YtDlpFetcher};
use subcast::server;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "subcast")]
#[command(version, about = "Subtitle translation and podcast narration server")]
#[command(
    long_about = "Serve endpoints that burn translated subtitles into videos or turn them into short narrated audio summaries."
)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    if let Err(e) = check_ffmpeg().await {
        warn!("{e}");
    }
    if !YtDlpFetcher::new().check_availability().await {
        warn!("yt-dlp not found; URL-based requests will fail");
    }

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("Invalid bind address")?;
    let app = server::router(Arc::new(config));

    info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
