use anyhow::{Context, Result};
use caption_stream::{create_router, AppState, Config, OpenRouterClient, ProviderSet};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "caption-stream", version, about = "Streams paced captions and translations over WebSocket")]
struct Args {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/caption-stream")]
    config: String,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Run without a transcription/translation provider (static and transcript strategies only)
    #[arg(long)]
    no_provider: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Upload directory: {}", cfg.uploads.dir.display());
    info!("Transcript path: {}", cfg.stream.transcript_path.display());

    let providers = if args.no_provider {
        warn!("Running without a provider; pipeline and translation are unavailable");
        ProviderSet::none()
    } else {
        let client = OpenRouterClient::new(&cfg.provider).context("Provider configuration")?;
        ProviderSet::from_client(Arc::new(client))
    };

    tokio::fs::create_dir_all(&cfg.uploads.dir)
        .await
        .with_context(|| format!("Failed to create {}", cfg.uploads.dir.display()))?;

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let app = create_router(AppState::new(cfg, providers));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
