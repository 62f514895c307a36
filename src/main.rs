use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use speech_stream::{
    create_factory, create_router, AppState, AudioFile, ChannelTransport, Config, Dispatcher,
    DispatcherConfig,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "speech-stream", version, about = "Streaming speech-to-text over WebSocket")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/speech-stream")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Accept streaming sessions (default)
    Serve,

    /// Stream a 16kHz mono WAV file through a local session and print the results
    Replay {
        wav: PathBuf,

        /// Chunk size in milliseconds
        #[arg(long, default_value_t = 250)]
        chunk_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config).context("Failed to load configuration")?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    // A missing or unloadable model is fatal before any session is accepted
    let factory = create_factory(&cfg.recognizer, &cfg.model_path())
        .context("Failed to initialize recognizer")?;

    let dispatcher = Dispatcher::new(
        factory,
        DispatcherConfig {
            recordings_dir: cfg.recordings_dir(),
            sample_rate: cfg.audio.sample_rate,
        },
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cfg, dispatcher).await,
        Command::Replay { wav, chunk_ms } => replay(&cfg, dispatcher, wav, chunk_ms).await,
    }
}

async fn serve(cfg: &Config, dispatcher: Dispatcher) -> Result<()> {
    let app = create_router(AppState::new(dispatcher), &cfg.service.http.ws_path);

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Streaming endpoint: ws://{}{}", addr, cfg.service.http.ws_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn replay(cfg: &Config, dispatcher: Dispatcher, wav: PathBuf, chunk_ms: u64) -> Result<()> {
    let audio = AudioFile::open(&wav)?;
    audio.ensure_mono(cfg.audio.sample_rate)?;

    let chunks = audio.pcm_chunks(chunk_ms);
    info!("Replaying {} ({} chunks of {}ms)", wav.display(), chunks.len(), chunk_ms);

    let (transport, mut peer) = ChannelTransport::pair(1);
    let session = tokio::spawn(async move { dispatcher.accept(transport).await });

    // Lockstep: every chunk is answered by exactly one result
    for chunk in chunks {
        if peer.send_audio(chunk).await.is_err() {
            break;
        }
        match peer.recv_result().await {
            Some(result) => println!("{}", result.to_json()?),
            None => break,
        }
    }
    peer.disconnect().await;

    let stats = session.await.context("Replay task panicked")??;

    if stats.transcript.is_empty() {
        warn!("No speech recognized");
    }
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(_) => std::future::pending::<()>().await,
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
