//! GSVC sender
//!
//! Serves synthetic JPEG-shaped frames from one or more sources to one TCP
//! client at a time. Ctrl-C stops the sender and its sources.

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use gsvc_core::FrameMailbox;
use gsvc_sender::{Sender, SenderConfig, spawn_sources};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gsvc-sender")]
#[command(about = "Serve a synthetic GSVC frame stream over TCP")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Number of sources
    #[arg(long, default_value_t = 1)]
    camera_count: u16,

    /// Frame-rate ceiling per client (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_fps: u32,

    /// Frames per second produced by each source
    #[arg(long, default_value_t = 30)]
    capture_fps: u32,

    /// Log stats every N sent frames (0 disables)
    #[arg(long, default_value_t = 120)]
    log_every: u64,

    /// Synthetic payload size in bytes
    #[arg(long, default_value_t = 64 * 1024)]
    payload_size: usize,
}

impl From<Args> for SenderConfig {
    fn from(args: Args) -> Self {
        Self {
            bind: format!("{}:{}", args.bind, args.port),
            source_count: args.camera_count,
            max_fps: args.max_fps,
            capture_fps: args.capture_fps,
            log_every: args.log_every,
            payload_size: args.payload_size,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SenderConfig::from(Args::parse());
    let mailbox = Arc::new(FrameMailbox::new(config.source_count));
    let sender = Sender::new(config, Arc::clone(&mailbox));

    let listener = match sender.bind().await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, "startup failed");
            return ExitCode::FAILURE;
        },
    };

    let sources = spawn_sources(sender.config(), &mailbox);
    info!(sources = sources.len(), "sources started");

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let result = sender.serve(listener, shutdown).await;
    mailbox.stop();
    for source in sources {
        if let Err(err) = source.await {
            error!(%err, "source task failed");
        }
    }

    match result {
        Ok(()) => {
            info!(
                captured = mailbox.pushed_count(),
                overwritten = mailbox.dropped_count(),
                "sender stopped"
            );
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!(%err, "sender failed");
            ExitCode::FAILURE
        },
    }
}
