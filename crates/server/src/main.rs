use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use audiofetch_core::SourcePattern;
use audiofetch_extract::YtDlp;
use audiofetch_search::YoutubeSearch;
use audiofetch_server::api::AppState;
use audiofetch_server::config::AppConfig;
use audiofetch_server::metrics::Metrics;
use audiofetch_server::ratelimit::RateLimiter;
use audiofetch_store::FileStore;

/// One-shot audio extraction HTTP server.
#[derive(Parser, Debug)]
#[command(name = "audiofetch-server", about = "HTTP backend for one-shot audio extraction")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "audiofetch.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration from TOML file, or use defaults if the file does
    // not exist.
    let config: AppConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        info!(path = %cli.config, "config file not found, using defaults");
        toml::from_str("")?
    };

    let output_dir = PathBuf::from(&config.download.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    let source_pattern = match config.download.source_pattern.as_deref() {
        Some(pattern) => SourcePattern::new(pattern)?,
        None => SourcePattern::default(),
    };

    let extractor = YtDlp::new(&config.download.binary).with_timeouts(
        Duration::from_secs(config.download.probe_timeout_seconds),
        Duration::from_secs(config.download.download_timeout_seconds),
    );
    let search = YoutubeSearch::new(config.search.placeholder_thumbnail.clone())?;

    let limiter = config
        .rate_limit
        .enabled
        .then(|| Arc::new(RateLimiter::new(config.rate_limit.clone())));

    let state = AppState {
        extractor: Arc::new(extractor),
        search: Arc::new(search),
        store: FileStore::new(),
        source_pattern,
        output_dir,
        search_limit: config.search.default_limit,
        metrics: Arc::new(Metrics::default()),
    };
    let app = audiofetch_server::api::router(state, limiter);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "audiofetch-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM. Client addresses
    // feed the per-route rate limit buckets.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
